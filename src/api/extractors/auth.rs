use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::member::Member;
use std::sync::Arc;
use tracing::Span;

/// Identity supplied by the upstream gateway via the X-Member-Id header.
/// Authentication itself happens upstream; this extractor only resolves the
/// id to a live member row.
pub struct AuthMember(pub Member);

async fn resolve_member<S>(parts: &mut Parts, state: &S) -> Result<Member, StatusCode>
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    let member_id = parts.headers.get("X-Member-Id")
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .to_string();

    let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

    let member = app_state.member_repo.find_by_id(&member_id).await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !member.is_active {
        return Err(StatusCode::FORBIDDEN);
    }

    Span::current().record("member_id", member.id.as_str());

    Ok(member)
}

impl<S> FromRequestParts<S> for AuthMember
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthMember(resolve_member(parts, state).await?))
    }
}

pub struct AdminMember(pub Member);

impl<S> FromRequestParts<S> for AdminMember
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let member = resolve_member(parts, state).await?;
        if !member.is_admin() {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(AdminMember(member))
    }
}
