mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{fmt_date, next_month_dates_for_weekday, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn book_one(app: &TestApp, admin_id: &str, member_id: &str) -> String {
    let date = fmt_date(next_month_dates_for_weekday(0)[0]);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/admin/days/open")
            .header("X-Member-Id", admin_id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": [date]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/reservations/batch")
            .header("X-Member-Id", member_id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": [date]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    parse_body(res).await["reservations"][0]["id"].as_str().unwrap().to_string()
}

async fn confirm(app: &TestApp, admin_id: &str, reservation_id: &str, amount: i64) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/admin/payments/confirm")
            .header("X-Member-Id", admin_id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({
                "reservation_id": reservation_id,
                "amount": amount,
                "method": "CARD"
            }).to_string())).unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_confirm_payment_records_and_confirms() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Pia", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let reservation_id = book_one(&app, &admin.id, &member.id).await;

    let res = confirm(&app, &admin.id, &reservation_id, 7000).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["reservation_id"], reservation_id.as_str());
    assert_eq!(body["amount"], 7000);
    assert_eq!(body["method"], "CARD");
    assert_eq!(body["confirmed_by"], admin.id.as_str());

    let row = app.state.reservation_repo.find_by_id(&reservation_id).await.unwrap().unwrap();
    assert_eq!(row.status, "CONFIRMED");
    assert!(row.is_paid);
    assert!(row.paid_at.is_some());
    assert_eq!(row.paid_confirmed_by.as_deref(), Some(admin.id.as_str()));

    let records = app.state.payment_repo.list_by_reservation(&reservation_id).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_reconfirming_payment_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Quin", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let reservation_id = book_one(&app, &admin.id, &member.id).await;

    let res = confirm(&app, &admin.id, &reservation_id, 7000).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = confirm(&app, &admin.id, &reservation_id, 7000).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // still a single audit row
    let records = app.state.payment_repo.list_by_reservation(&reservation_id).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_confirm_payment_rejects_cancelled_reservation() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Rhea", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let reservation_id = book_one(&app, &admin.id, &member.id).await;
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/reservations/release")
            .header("X-Member-Id", &member.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"reservation_ids": [reservation_id]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = confirm(&app, &admin.id, &reservation_id, 7000).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let records = app.state.payment_repo.list_by_reservation(&reservation_id).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_confirm_payment_validates_input() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Sol", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let reservation_id = book_one(&app, &admin.id, &member.id).await;

    let res = confirm(&app, &admin.id, &reservation_id, -100).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = confirm(&app, &admin.id, "no-such-id", 7000).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_reservation_state_machine() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Tao", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let reservation_id = book_one(&app, &admin.id, &member.id).await;
    let res = confirm(&app, &admin.id, &reservation_id, 7000).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/admin/reservations/{}/complete", reservation_id))
            .header("X-Member-Id", &admin.id)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["status"], "COMPLETED");

    // no transition out of COMPLETED
    let res = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/admin/reservations/{}/complete", reservation_id))
            .header("X-Member-Id", &admin.id)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = confirm(&app, &admin.id, &reservation_id, 7000).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // and a completed slot cannot be self-released
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/reservations/release")
            .header("X-Member-Id", &member.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"reservation_ids": [reservation_id]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_complete_rejects_cancelled_and_unknown() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Ute", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let reservation_id = book_one(&app, &admin.id, &member.id).await;
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/reservations/release")
            .header("X-Member-Id", &member.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"reservation_ids": [reservation_id]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/admin/reservations/{}/complete", reservation_id))
            .header("X-Member-Id", &admin.id)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri("/api/v1/admin/reservations/no-such-id/complete")
            .header("X-Member-Id", &admin.id)
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
