use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::repository::FollowRepository;
use super::service::FollowService;
use crate::api::ApiState;
use crate::auth::{CredentialVerifier, PrincipalDirectory, PrincipalId};
use crate::error::ServiceError;
use crate::notifications::NotificationSink;

type FollowState<S, N> = ApiState<FollowService<S, N>>;

pub fn follow_router<S, N>(
    service: Arc<FollowService<S, N>>,
    verifier: Arc<dyn CredentialVerifier>,
) -> Router
where
    S: FollowRepository + PrincipalDirectory + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route("/api/v1/users/following", get(following_handler::<S, N>))
        .route(
            "/api/v1/users/:company_id/follow",
            post(follow_handler::<S, N>),
        )
        .route(
            "/api/v1/users/:company_id/unfollow",
            post(unfollow_handler::<S, N>),
        )
        .with_state(ApiState::new(service, verifier))
}

pub(crate) async fn follow_handler<S, N>(
    State(state): State<FollowState<S, N>>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
) -> Result<Json<Value>, ServiceError>
where
    S: FollowRepository + PrincipalDirectory + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    state
        .service
        .follow(&principal, &PrincipalId(company_id))?;
    Ok(Json(json!({ "message": "company followed" })))
}

pub(crate) async fn unfollow_handler<S, N>(
    State(state): State<FollowState<S, N>>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
) -> Result<Json<Value>, ServiceError>
where
    S: FollowRepository + PrincipalDirectory + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    state
        .service
        .unfollow(&principal, &PrincipalId(company_id))?;
    Ok(Json(json!({ "message": "company unfollowed" })))
}

pub(crate) async fn following_handler<S, N>(
    State(state): State<FollowState<S, N>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError>
where
    S: FollowRepository + PrincipalDirectory + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let following = state.service.following(&principal)?;
    Ok(Json(json!({ "count": following.len(), "following": following })))
}
