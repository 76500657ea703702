use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use super::domain::{JobDraft, JobId, JobPatch, JobQuery};
use super::repository::JobRepository;
use super::service::JobService;
use crate::api::ApiState;
use crate::auth::CredentialVerifier;
use crate::error::ServiceError;
use crate::follows::FollowRepository;
use crate::notifications::NotificationSink;

type JobState<S, N> = ApiState<JobService<S, N>>;

/// Router builder exposing the job registry.
pub fn job_router<S, N>(
    service: Arc<JobService<S, N>>,
    verifier: Arc<dyn CredentialVerifier>,
) -> Router
where
    S: JobRepository + FollowRepository + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_handler::<S, N>).post(create_handler::<S, N>),
        )
        .route("/api/v1/jobs/my-jobs", get(my_jobs_handler::<S, N>))
        .route(
            "/api/v1/jobs/:job_id",
            get(get_handler::<S, N>)
                .put(update_handler::<S, N>)
                .delete(delete_handler::<S, N>),
        )
        .with_state(ApiState::new(service, verifier))
}

pub(crate) async fn create_handler<S, N>(
    State(state): State<JobState<S, N>>,
    headers: HeaderMap,
    Json(draft): Json<JobDraft>,
) -> Result<Response, ServiceError>
where
    S: JobRepository + FollowRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let job = state.service.create_job(&principal, draft)?;
    Ok((StatusCode::CREATED, Json(json!({ "job": job }))).into_response())
}

pub(crate) async fn list_handler<S, N>(
    State(state): State<JobState<S, N>>,
    Query(query): Query<JobQuery>,
) -> Result<Json<Value>, ServiceError>
where
    S: JobRepository + FollowRepository + 'static,
    N: NotificationSink + 'static,
{
    let page = state.service.list_jobs(&query)?;
    Ok(Json(json!({
        "count": page.items.len(),
        "total": page.total,
        "pages": page.pages,
        "page": page.page,
        "jobs": page.items,
    })))
}

pub(crate) async fn my_jobs_handler<S, N>(
    State(state): State<JobState<S, N>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ServiceError>
where
    S: JobRepository + FollowRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let jobs = state.service.list_my_jobs(&principal)?;
    Ok(Json(json!({ "count": jobs.len(), "jobs": jobs })))
}

pub(crate) async fn get_handler<S, N>(
    State(state): State<JobState<S, N>>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ServiceError>
where
    S: JobRepository + FollowRepository + 'static,
    N: NotificationSink + 'static,
{
    let job = state.service.get_job(&JobId(job_id))?;
    Ok(Json(json!({ "job": job })))
}

pub(crate) async fn update_handler<S, N>(
    State(state): State<JobState<S, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Result<Json<Value>, ServiceError>
where
    S: JobRepository + FollowRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let job = state.service.update_job(&principal, &JobId(job_id), patch)?;
    Ok(Json(json!({ "job": job })))
}

pub(crate) async fn delete_handler<S, N>(
    State(state): State<JobState<S, N>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ServiceError>
where
    S: JobRepository + FollowRepository + 'static,
    N: NotificationSink + 'static,
{
    let principal = state.principal(&headers)?;
    let job = state.service.delete_job(&principal, &JobId(job_id))?;
    Ok(Json(json!({ "message": "job deleted", "id": job.id })))
}
