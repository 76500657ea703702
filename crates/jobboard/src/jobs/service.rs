use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{Job, JobDraft, JobFilter, JobId, JobPatch, JobQuery};
use super::repository::JobRepository;
use crate::auth::{assert_owner, require_role, Principal, Role};
use crate::error::ServiceError;
use crate::follows::FollowRepository;
use crate::notifications::{NotificationSink, WorkflowEvent};
use crate::query::{Page, PageRequest};

/// Owns postings and their active/inactive lifecycle.
pub struct JobService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> JobService<S, N>
where
    S: JobRepository + FollowRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Persist a new posting and notify everyone following the employer right now.
    pub fn create_job(&self, principal: &Principal, draft: JobDraft) -> Result<Job, ServiceError> {
        require_role(Some(principal), &[Role::Employer])?;
        let job = draft.into_job(principal.id.clone(), Utc::now())?;
        let job = self.store.insert_job(job)?;
        info!(job_id = %job.id, owner = %principal.id, title = %job.title, "job posted");

        match self.store.followers_of(&principal.id) {
            Ok(followers) if followers.is_empty() => {}
            Ok(followers) => {
                let event = WorkflowEvent::JobPosted {
                    employer: principal.id.clone(),
                    employer_name: principal.display_name.clone(),
                    job_id: job.id.clone(),
                    title: job.title.clone(),
                    followers,
                };
                if let Err(err) = self.notifier.dispatch(event) {
                    warn!(job_id = %job.id, error = %err, "job_posted fan-out not queued");
                }
            }
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "unable to resolve followers for fan-out")
            }
        }

        Ok(job)
    }

    pub fn get_job(&self, id: &JobId) -> Result<Job, ServiceError> {
        self.store
            .fetch_job(id)?
            .ok_or(ServiceError::NotFound("job"))
    }

    pub fn update_job(
        &self,
        principal: &Principal,
        id: &JobId,
        patch: JobPatch,
    ) -> Result<Job, ServiceError> {
        require_role(Some(principal), &[Role::Employer])?;
        let mut job = self.get_job(id)?;
        assert_owner(&job, principal, "update this job")?;
        patch.apply(&mut job, Utc::now())?;
        let job = self.store.update_job(job)?;
        info!(job_id = %job.id, active = job.is_active, "job updated");
        Ok(job)
    }

    /// Hard delete. Applications that reference the job are left in place.
    pub fn delete_job(&self, principal: &Principal, id: &JobId) -> Result<Job, ServiceError> {
        require_role(Some(principal), &[Role::Employer])?;
        let job = self.get_job(id)?;
        assert_owner(&job, principal, "delete this job")?;
        let removed = self.store.delete_job(&job.id)?;
        info!(
            job_id = %removed.id,
            applicants = removed.applicant_count,
            "job deleted"
        );
        Ok(removed)
    }

    pub fn list_jobs(&self, query: &JobQuery) -> Result<Page<Job>, ServiceError> {
        let filter = JobFilter::from_query(query)?;
        let page = PageRequest::new(query.page, query.limit)?;
        Ok(self.store.search_jobs(&filter, &page)?)
    }

    /// Every posting of the caller, inactive ones included, newest first.
    pub fn list_my_jobs(&self, principal: &Principal) -> Result<Vec<Job>, ServiceError> {
        require_role(Some(principal), &[Role::Employer])?;
        Ok(self.store.jobs_by_owner(&principal.id)?)
    }
}
