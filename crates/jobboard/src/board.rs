//! Wiring of every workflow service over one shared store and notifier.

use std::sync::Arc;

use axum::Router;

use crate::applications::{application_router, ApplicationService};
use crate::auth::CredentialVerifier;
use crate::follows::{follow_router, FollowService};
use crate::jobs::{job_router, JobService};
use crate::notifications::{notification_router, NotificationService, NotificationSink};
use crate::store::BoardStore;

pub struct Board<S, N> {
    pub jobs: Arc<JobService<S, N>>,
    pub applications: Arc<ApplicationService<S, N>>,
    pub follows: Arc<FollowService<S, N>>,
    pub notifications: Arc<NotificationService<S>>,
}

impl<S, N> Board<S, N>
where
    S: BoardStore,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            jobs: Arc::new(JobService::new(store.clone(), notifier.clone())),
            applications: Arc::new(ApplicationService::new(store.clone(), notifier.clone())),
            follows: Arc::new(FollowService::new(store.clone(), notifier)),
            notifications: Arc::new(NotificationService::new(store)),
        }
    }

    /// All `/api/v1` routes, authenticated through `verifier`.
    pub fn router(&self, verifier: Arc<dyn CredentialVerifier>) -> Router {
        Router::new()
            .merge(job_router(self.jobs.clone(), verifier.clone()))
            .merge(application_router(
                self.applications.clone(),
                verifier.clone(),
            ))
            .merge(follow_router(self.follows.clone(), verifier.clone()))
            .merge(notification_router(self.notifications.clone(), verifier))
    }
}

impl<S, N> Clone for Board<S, N> {
    fn clone(&self) -> Self {
        Self {
            jobs: self.jobs.clone(),
            applications: self.applications.clone(),
            follows: self.follows.clone(),
            notifications: self.notifications.clone(),
        }
    }
}
