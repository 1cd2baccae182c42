use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminMember;
use crate::api::dtos::requests::{MonthQuery, OpenDaysRequest, CancelDaysRequest, UpdateDayCapacityRequest};
use crate::error::AppError;
use std::sync::Arc;

pub async fn open_days(
    State(state): State<Arc<AppState>>,
    AdminMember(admin): AdminMember,
    Json(payload): Json<OpenDaysRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.booking_engine.open_next_month(&admin, &payload.dates).await?;
    Ok(Json(outcome))
}

pub async fn cancel_days(
    State(state): State<Arc<AppState>>,
    AdminMember(admin): AdminMember,
    Json(payload): Json<CancelDaysRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.booking_engine.cancel_days(&admin, &payload.dates).await?;
    Ok(Json(outcome))
}

pub async fn update_capacity(
    State(state): State<Arc<AppState>>,
    AdminMember(admin): AdminMember,
    Json(payload): Json<UpdateDayCapacityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let saved = state.booking_engine
        .update_day_capacity(&admin, &payload.date, &payload.schedule_id, payload.capacity_override)
        .await?;
    Ok(Json(saved))
}

pub async fn admin_calendar(
    State(state): State<Arc<AppState>>,
    AdminMember(_admin): AdminMember,
    Query(params): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let calendar = state.booking_engine.admin_calendar(&params.month).await?;
    Ok(Json(calendar))
}
