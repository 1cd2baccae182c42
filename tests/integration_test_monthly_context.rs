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

async fn monthly(app: &TestApp, member_id: &str, month: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/reservations/monthly?month={}", month))
            .header("X-Member-Id", member_id)
            .body(Body::empty()).unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_monthly_context_reports_reservation_statuses() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Ana", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let mondays = next_month_dates_for_weekday(0);
    let month = mondays[0].format("%Y-%m").to_string();
    let dates: Vec<String> = mondays.iter().copied().map(fmt_date).collect();

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/admin/days/open")
            .header("X-Member-Id", &admin.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": dates}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/reservations/batch")
            .header("X-Member-Id", &member.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": [dates[0], dates[1]]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // admin cancels the second booked Monday
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/admin/days/cancel")
            .header("X-Member-Id", &admin.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": [dates[1]]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = monthly(&app, &member.id, &month).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;

    let days = body["days"].as_array().unwrap();
    // one calendar entry per Monday of the month
    assert_eq!(days.len(), mondays.len());

    let by_date = |d: &str| days.iter().find(|e| e["date"] == d).unwrap().clone();
    assert_eq!(by_date(&dates[0])["status"], "RESERVED");
    assert_eq!(by_date(&dates[1])["status"], "CANCELLED");
    assert_eq!(by_date(&dates[2])["status"], Value::Null);

    assert_eq!(body["price_per_session"], 7000);
    assert_eq!(body["pending_refund_total"], 7000);
}

#[tokio::test]
async fn test_can_reserve_next_month_flag() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Ben", "NON_MEMBER").await;
    app.seed_schedule(0, 10).await;

    let today = chrono::Utc::now().date_naive();
    let current_month = today.format("%Y-%m").to_string();

    // nothing opened yet
    let res = monthly(&app, &member.id, &current_month).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["can_reserve_next_month"], false);
    assert!(body["next_month_open_dates"].as_array().unwrap().is_empty());

    // admin opens two Mondays of next month
    let mondays = next_month_dates_for_weekday(0);
    let open: Vec<String> = mondays.iter().take(2).copied().map(fmt_date).collect();
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/admin/days/open")
            .header("X-Member-Id", &admin.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": open}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = monthly(&app, &member.id, &current_month).await;
    let body = parse_body(res).await;
    assert_eq!(body["can_reserve_next_month"], true);
    assert_eq!(body["next_month_open_dates"].as_array().unwrap().len(), 2);
    assert_eq!(body["price_per_session"], 10000);
}

#[tokio::test]
async fn test_monthly_context_rejects_bad_month() {
    let app = TestApp::new().await;
    let member = app.seed_member("Cleo", "MEMBER").await;

    let res = monthly(&app, &member.id, "2025-13").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = monthly(&app, &member.id, "202501").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
