use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminMember;
use crate::api::dtos::requests::{CreateScheduleRequest, UpdateScheduleRequest};
use crate::domain::models::schedule::NewScheduleParams;
use crate::domain::services::booking::UpdateScheduleParams;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    AdminMember(_admin): AdminMember,
) -> Result<impl IntoResponse, AppError> {
    let schedules = state.booking_engine.list_schedules().await?;
    Ok(Json(schedules))
}

pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    AdminMember(_admin): AdminMember,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.booking_engine.create_schedule(NewScheduleParams {
        day_of_week: payload.day_of_week,
        start_time: payload.start_time,
        end_time: payload.end_time,
        default_capacity: payload.default_capacity,
        lane_count: payload.lane_count,
    }).await?;
    Ok(Json(created))
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    AdminMember(_admin): AdminMember,
    Path(schedule_id): Path<String>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.booking_engine.update_schedule(&schedule_id, UpdateScheduleParams {
        day_of_week: payload.day_of_week,
        start_time: payload.start_time,
        end_time: payload.end_time,
        default_capacity: payload.default_capacity,
        lane_count: payload.lane_count,
        is_active: payload.is_active,
    }).await?;
    Ok(Json(updated))
}

pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    AdminMember(_admin): AdminMember,
    Path(schedule_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let deactivated = state.booking_engine.delete_schedule(&schedule_id).await?;
    let status = if deactivated { "deactivated" } else { "deleted" };
    Ok(Json(serde_json::json!({ "status": status })))
}
