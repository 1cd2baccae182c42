use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, member, schedule, reservation, admin_day, payment};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Member booking flow
        .route("/api/v1/reservations/monthly", get(reservation::get_monthly_context))
        .route("/api/v1/reservations/batch", post(reservation::create_batch))
        .route("/api/v1/reservations/release", post(reservation::release_slots))

        // Admin: schedule registry
        .route("/api/v1/admin/schedules", get(schedule::list_schedules).post(schedule::create_schedule))
        .route("/api/v1/admin/schedules/{schedule_id}", put(schedule::update_schedule).delete(schedule::delete_schedule))

        // Admin: day management
        .route("/api/v1/admin/days/open", post(admin_day::open_days))
        .route("/api/v1/admin/days/cancel", post(admin_day::cancel_days))
        .route("/api/v1/admin/days/capacity", put(admin_day::update_capacity))
        .route("/api/v1/admin/calendar", get(admin_day::admin_calendar))

        // Admin: payments & completion
        .route("/api/v1/admin/payments/confirm", post(payment::confirm_payment))
        .route("/api/v1/admin/reservations/{reservation_id}/complete", post(payment::complete_reservation))

        // Admin: members
        .route("/api/v1/admin/members", post(member::create_member).get(member::list_members))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        member_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
