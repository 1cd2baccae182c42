mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::{fmt_date, next_month_dates_for_weekday, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn open_days(app: &TestApp, admin_id: &str, dates: &[String]) {
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/admin/days/open")
            .header("X-Member-Id", admin_id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": dates}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

async fn batch(app: &TestApp, member_id: &str, dates: &[String]) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/reservations/batch")
            .header("X-Member-Id", member_id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": dates}).to_string())).unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_batch_creates_pending_reservations_and_totals() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Dana", "NON_MEMBER").await;
    app.seed_schedule(0, 10).await;

    let dates: Vec<String> = next_month_dates_for_weekday(0)
        .into_iter().take(3).map(fmt_date).collect();
    open_days(&app, &admin.id, &dates).await;

    let res = batch(&app, &member.id, &dates).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["session_count"], 3);
    assert_eq!(body["price_per_session"], 10000);
    assert_eq!(body["pending_refund_total"], 0);
    assert_eq!(body["total_amount"], 30000);

    let rows = body["reservations"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row["status"], "PENDING");
        assert_eq!(row["is_paid"], false);
    }

    // confirmation notification carries the booked dates and total
    let calls = app.notifier.batch_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].session_count, 3);
    assert_eq!(calls[0].total_amount, 30000);
}

#[tokio::test]
async fn test_member_tier_gets_member_price() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Erin", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let dates: Vec<String> = next_month_dates_for_weekday(0)
        .into_iter().take(2).map(fmt_date).collect();
    open_days(&app, &admin.id, &dates).await;

    let res = batch(&app, &member.id, &dates).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["price_per_session"], 7000);
    assert_eq!(body["total_amount"], 14000);
}

#[tokio::test]
async fn test_batch_rejects_dates_outside_next_month() {
    let app = TestApp::new().await;
    let member = app.seed_member("Finn", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    // a date two months out is outside the enrollment window
    let today = Utc::now().date_naive();
    let far = today + Duration::days(70);

    let res = batch(&app, &member.id, &[fmt_date(far)]).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_batch_rejects_weekday_without_schedule() {
    let app = TestApp::new().await;
    let member = app.seed_member("Gail", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    // Tuesday has no schedule
    let tuesday = next_month_dates_for_weekday(1)[0];
    let res = batch(&app, &member.id, &[fmt_date(tuesday)]).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_rejects_unopened_day() {
    let app = TestApp::new().await;
    let member = app.seed_member("Hugo", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let monday = next_month_dates_for_weekday(0)[0];
    let res = batch(&app, &member.id, &[fmt_date(monday)]).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_batch_rejects_duplicate_reservation() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Iris", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let date = fmt_date(next_month_dates_for_weekday(0)[0]);
    open_days(&app, &admin.id, std::slice::from_ref(&date)).await;

    // same date twice in one batch
    let res = batch(&app, &member.id, &[date.clone(), date.clone()]).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // and a re-book of an already held date
    let ok = batch(&app, &member.id, std::slice::from_ref(&date)).await;
    assert_eq!(ok.status(), StatusCode::OK);
    let res = batch(&app, &member.id, &[date]).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_batch_is_all_or_nothing() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Jo", "MEMBER").await;
    let other = app.seed_member("Kim", "MEMBER").await;
    let schedule = app.seed_schedule(0, 1).await;

    let mondays = next_month_dates_for_weekday(0);
    let open: Vec<String> = mondays.iter().take(2).copied().map(fmt_date).collect();
    open_days(&app, &admin.id, &open).await;

    // other member fills the second Monday (capacity 1)
    let res = batch(&app, &other.id, &[open[1].clone()]).await;
    assert_eq!(res.status(), StatusCode::OK);

    // first date is valid, second is full: the whole batch must fail
    let res = batch(&app, &member.id, &open).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let count = app.state.reservation_repo
        .count_active_for_day(&schedule.id, mondays[0])
        .await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_pending_refunds_net_against_total_but_stay_pending() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Lena", "NON_MEMBER").await;
    app.seed_schedule(0, 10).await;

    let mondays = next_month_dates_for_weekday(0);
    let all: Vec<String> = mondays.iter().copied().map(fmt_date).collect();
    open_days(&app, &admin.id, &all).await;

    // book one day, then have the admin cancel it: 10000 pending refund
    let res = batch(&app, &member.id, &[all[0].clone()]).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/admin/days/cancel")
            .header("X-Member-Id", &admin.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": [all[0]]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(app.state.refund_repo.sum_pending(&member.id).await.unwrap(), 10000);

    // 3 sessions * 10000 - 10000 pending = 20000
    let res = batch(&app, &member.id, &all[1..4].to_vec()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["pending_refund_total"], 10000);
    assert_eq!(body["total_amount"], 20000);

    // netting does not consume the refund: it is still pending afterwards
    assert_eq!(app.state.refund_repo.sum_pending(&member.id).await.unwrap(), 10000);
}

#[tokio::test]
async fn test_total_amount_is_floored_at_zero() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let member = app.seed_member("Mika", "NON_MEMBER").await;
    app.seed_schedule(0, 10).await;

    let mondays = next_month_dates_for_weekday(0);
    let all: Vec<String> = mondays.iter().copied().map(fmt_date).collect();
    open_days(&app, &admin.id, &all).await;

    // two cancelled bookings -> 20000 pending refunds
    let res = batch(&app, &member.id, &all[0..2].to_vec()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/admin/days/cancel")
            .header("X-Member-Id", &admin.id)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({"dates": [all[0], all[1]]}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // one 10000 session against 20000 pending refunds: floored, not negative
    let res = batch(&app, &member.id, &[all[2].clone()]).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["pending_refund_total"], 20000);
    assert_eq!(body["total_amount"], 0);
}

#[tokio::test]
async fn test_batch_rejects_malformed_date() {
    let app = TestApp::new().await;
    let member = app.seed_member("Noa", "MEMBER").await;
    app.seed_schedule(0, 10).await;

    let res = batch(&app, &member.id, &["01/15/2025".to_string()]).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = batch(&app, &member.id, &[]).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
