use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Number, Value};

use super::domain::{ApplicationId, ApplicationSubmission};
use super::repository::ApplicationRepository;
use super::service::ApplicationService;
use crate::api::ApiState;
use crate::auth::CredentialVerifier;
use crate::error::ServiceError;
use crate::jobs::{JobId, JobRepository};
use crate::notifications::NotificationSink;

type ApplicationState<S, N> = ApiState<ApplicationService<S, N>>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusChange {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatingRequest {
    pub rating: Option<Number>,
    pub rating_comment: Option<String>,
}

impl RatingRequest {
    /// Only whole numbers are ratings; range is checked by the service.
    fn rating(&self) -> Result<i64, ServiceError> {
        self.rating
            .as_ref()
            .and_then(Number::as_i64)
            .ok_or_else(|| ServiceError::validation("rating must be between 1 and 5"))
    }
}

/// Router builder exposing the application workflow.
pub fn application_router<S, N>(
    service: Arc<ApplicationService<S, N>>,
    verifier: Arc<dyn CredentialVerifier>,
) -> Router
where
    S: ApplicationRepository + JobRepository + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_mine_handler::<S, N>).post(submit_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/job/:job_id",
            get(list_for_job_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            put(status_handler::<S, N>).delete(withdraw_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/rate",
            put(rate_handler::<S, N>),
        )
        .with_state(ApiState::new(service, verifier))
}

pub(crate) async fn submit_handler<S, N>(
    State(state): State<ApplicationState<S, N>>,
    headers: HeaderMap,
    Json(submission): Json<ApplicationSubmission>,
) -> Result<Response, ServiceError>
where
    S: ApplicationRepository + JobRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let application = state.service.submit(&principal, submission)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "application": application })),
    )
        .into_response())
}

pub(crate) async fn list_mine_handler<S, N>(
    State(state): State<ApplicationState<S, N>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError>
where
    S: ApplicationRepository + JobRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let applications = state.service.list_for_applicant(&principal)?;
    Ok(Json(json!({
        "count": applications.len(),
        "applications": applications,
    })))
}

pub(crate) async fn list_for_job_handler<S, N>(
    State(state): State<ApplicationState<S, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ServiceError>
where
    S: ApplicationRepository + JobRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let applications = state.service.list_for_job(&principal, &JobId(job_id))?;
    Ok(Json(json!({
        "count": applications.len(),
        "applications": applications,
    })))
}

pub(crate) async fn status_handler<S, N>(
    State(state): State<ApplicationState<S, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Value>, ServiceError>
where
    S: ApplicationRepository + JobRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let application = state.service.set_status(
        &principal,
        &ApplicationId(application_id),
        &change.status,
    )?;
    Ok(Json(json!({ "application": application })))
}

pub(crate) async fn rate_handler<S, N>(
    State(state): State<ApplicationState<S, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<Value>, ServiceError>
where
    S: ApplicationRepository + JobRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let rating = request.rating()?;
    let application = state.service.rate(
        &principal,
        &ApplicationId(application_id),
        rating,
        request.rating_comment,
    )?;
    Ok(Json(json!({ "application": application })))
}

pub(crate) async fn withdraw_handler<S, N>(
    State(state): State<ApplicationState<S, N>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Result<Json<Value>, ServiceError>
where
    S: ApplicationRepository + JobRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    state
        .service
        .withdraw(&principal, &ApplicationId(application_id))?;
    Ok(Json(json!({ "message": "application withdrawn" })))
}
