use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminMember;
use crate::api::dtos::requests::ConfirmPaymentRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    AdminMember(admin): AdminMember,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.booking_engine
        .confirm_payment(&payload.reservation_id, payload.amount, &payload.method, &admin.id)
        .await?;
    Ok(Json(record))
}

pub async fn complete_reservation(
    State(state): State<Arc<AppState>>,
    AdminMember(_admin): AdminMember,
    Path(reservation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let completed = state.booking_engine.complete_reservation(&reservation_id).await?;
    Ok(Json(completed))
}
