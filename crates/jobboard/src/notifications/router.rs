use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, put},
    Json, Router,
};
use serde_json::{json, Value};

use super::domain::{NotificationFeed, NotificationId};
use super::repository::NotificationRepository;
use super::service::NotificationService;
use crate::api::ApiState;
use crate::auth::CredentialVerifier;
use crate::error::ServiceError;

type NotificationState<S> = ApiState<NotificationService<S>>;

pub fn notification_router<S>(
    service: Arc<NotificationService<S>>,
    verifier: Arc<dyn CredentialVerifier>,
) -> Router
where
    S: NotificationRepository + 'static,
{
    Router::new()
        .route("/api/v1/notifications", get(list_handler::<S>))
        .route(
            "/api/v1/notifications/read-all",
            put(read_all_handler::<S>),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            put(read_handler::<S>),
        )
        .route(
            "/api/v1/notifications/:notification_id",
            delete(delete_handler::<S>),
        )
        .with_state(ApiState::new(service, verifier))
}

pub(crate) async fn list_handler<S>(
    State(state): State<NotificationState<S>>,
    headers: HeaderMap,
) -> Result<Json<NotificationFeed>, ServiceError>
where
    S: NotificationRepository + 'static,
{
    let principal = state.principal(&headers)?;
    state.service.list(&principal).map(Json)
}

pub(crate) async fn read_handler<S>(
    State(state): State<NotificationState<S>>,
    headers: HeaderMap,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>, ServiceError>
where
    S: NotificationRepository + 'static,
{
    let principal = state.principal(&headers)?;
    let notification = state
        .service
        .mark_read(&principal, &NotificationId(notification_id))?;
    Ok(Json(json!({ "notification": notification })))
}

pub(crate) async fn read_all_handler<S>(
    State(state): State<NotificationState<S>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError>
where
    S: NotificationRepository + 'static,
{
    let principal = state.principal(&headers)?;
    let updated = state.service.mark_all_read(&principal)?;
    Ok(Json(json!({
        "message": "all notifications marked as read",
        "updated": updated,
    })))
}

pub(crate) async fn delete_handler<S>(
    State(state): State<NotificationState<S>>,
    headers: HeaderMap,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>, ServiceError>
where
    S: NotificationRepository + 'static,
{
    let principal = state.principal(&headers)?;
    state
        .service
        .delete(&principal, &NotificationId(notification_id))?;
    Ok(Json(json!({ "message": "notification deleted" })))
}
