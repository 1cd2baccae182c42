use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthMember;
use crate::api::dtos::requests::{MonthQuery, BatchReservationRequest, ReleaseSlotsRequest};
use crate::error::AppError;
use std::sync::Arc;

pub async fn get_monthly_context(
    State(state): State<Arc<AppState>>,
    AuthMember(member): AuthMember,
    Query(params): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let context = state.booking_engine.monthly_context(&member, &params.month).await?;
    Ok(Json(context))
}

pub async fn create_batch(
    State(state): State<Arc<AppState>>,
    AuthMember(member): AuthMember,
    Json(payload): Json<BatchReservationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.booking_engine.create_batch_reservations(&member, &payload.dates).await?;
    Ok(Json(outcome))
}

pub async fn release_slots(
    State(state): State<Arc<AppState>>,
    AuthMember(member): AuthMember,
    Json(payload): Json<ReleaseSlotsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.booking_engine.release_slots(&member, &payload.reservation_ids).await?;
    Ok(Json(outcome))
}
