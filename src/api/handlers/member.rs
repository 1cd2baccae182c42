use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminMember;
use crate::api::dtos::requests::CreateMemberRequest;
use crate::domain::models::member::Member;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    AdminMember(_admin): AdminMember,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.membership != "MEMBER" && payload.membership != "NON_MEMBER" {
        return Err(AppError::Validation("membership must be MEMBER or NON_MEMBER".into()));
    }

    let mut member = Member::new(payload.name, payload.email, payload.membership);
    if let Some(role) = payload.role {
        if role != "MEMBER" && role != "ADMIN" {
            return Err(AppError::Validation("role must be MEMBER or ADMIN".into()));
        }
        member.role = role;
    }

    let created = state.member_repo.create(&member).await?;
    info!("Created member: {}", created.id);
    Ok(Json(created))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    AdminMember(_admin): AdminMember,
) -> Result<impl IntoResponse, AppError> {
    let members = state.member_repo.list().await?;
    Ok(Json(members))
}
