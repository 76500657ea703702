use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    ApplicantApplicationView, Application, ApplicationId, ApplicationStatus, ApplicationSubmission,
    Rating,
};
use super::repository::ApplicationRepository;
use crate::auth::{assert_owner, require_role, Principal, Role};
use crate::error::ServiceError;
use crate::jobs::{Job, JobId, JobRepository};
use crate::notifications::{NotificationSink, WorkflowEvent};
use crate::store::RepositoryError;

/// Service driving an application from submission to withdrawal.
pub struct ApplicationService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> ApplicationService<S, N>
where
    S: ApplicationRepository + JobRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Submit on behalf of a seeker. The store enforces one application per
    /// `(job, applicant)` and bumps the job's counter in the same step.
    pub fn submit(
        &self,
        principal: &Principal,
        submission: ApplicationSubmission,
    ) -> Result<Application, ServiceError> {
        require_role(Some(principal), &[Role::Seeker])?;
        let job_id = submission.job_id()?;
        let job = self.job(&job_id)?;

        let application =
            submission.into_application(job.id.clone(), principal.id.clone(), Utc::now());
        let (application, applicant_count) = self
            .store
            .insert_application(application)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ServiceError::conflict("you have already applied for this job")
                }
                RepositoryError::NotFound => ServiceError::NotFound("job"),
                other => other.into(),
            })?;
        info!(
            application_id = %application.id,
            job_id = %job.id,
            applicant = %principal.id,
            applicant_count,
            "application submitted"
        );

        self.notify(WorkflowEvent::JobApplied {
            employer: job.owner_id.clone(),
            applicant: principal.id.clone(),
            applicant_name: principal.display_name.clone(),
            job_id: job.id.clone(),
            title: job.title.clone(),
            application_id: application.id.clone(),
        });
        Ok(application)
    }

    /// Any of the five statuses may be set at any time by the job's owner.
    pub fn set_status(
        &self,
        principal: &Principal,
        id: &ApplicationId,
        status: &str,
    ) -> Result<Application, ServiceError> {
        require_role(Some(principal), &[Role::Employer])?;
        let application = self.application(id)?;
        let job = self.job(&application.job_id)?;
        assert_owner(&job, principal, "update this application")?;
        let status = ApplicationStatus::parse(status)?;

        let (application, previous) = self
            .store
            .set_application_status(&application.id, status, Utc::now())
            .map_err(application_gone)?;
        info!(
            application_id = %application.id,
            from = previous.label(),
            to = status.label(),
            "application status set"
        );

        self.notify(WorkflowEvent::ApplicationUpdated {
            applicant: application.applicant_id.clone(),
            employer: principal.id.clone(),
            job_id: job.id,
            application_id: application.id.clone(),
            status,
        });
        Ok(application)
    }

    /// Overwrites any earlier rating. Produces no notification.
    pub fn rate(
        &self,
        principal: &Principal,
        id: &ApplicationId,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Application, ServiceError> {
        let rating = Rating::new(rating)?;
        require_role(Some(principal), &[Role::Employer])?;
        let application = self.application(id)?;
        let job = self.job(&application.job_id)?;
        assert_owner(&job, principal, "rate this applicant")?;

        let comment = comment.filter(|text| !text.trim().is_empty());
        let application = self
            .store
            .set_application_rating(&application.id, rating, comment, Utc::now())
            .map_err(application_gone)?;
        info!(
            application_id = %application.id,
            rating = rating.value(),
            "applicant rated"
        );
        Ok(application)
    }

    /// Applicant-only delete; frees the `(job, applicant)` pair and decrements
    /// the job's counter.
    pub fn withdraw(&self, principal: &Principal, id: &ApplicationId) -> Result<(), ServiceError> {
        require_role(Some(principal), &[Role::Seeker])?;
        let application = self.application(id)?;
        assert_owner(&application, principal, "withdraw this application")?;

        let (removed, applicant_count) = self
            .store
            .remove_application(&application.id)
            .map_err(application_gone)?;
        match applicant_count {
            Some(count) => info!(
                application_id = %removed.id,
                job_id = %removed.job_id,
                applicant_count = count,
                "application withdrawn"
            ),
            None => info!(
                application_id = %removed.id,
                job_id = %removed.job_id,
                "application withdrawn from a deleted job"
            ),
        }
        Ok(())
    }

    pub fn list_for_applicant(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicantApplicationView>, ServiceError> {
        require_role(Some(principal), &[Role::Seeker])?;
        self.store
            .applications_by_applicant(&principal.id)?
            .into_iter()
            .map(|application| {
                let job = self.store.fetch_job(&application.job_id)?;
                Ok::<_, ServiceError>(ApplicantApplicationView {
                    application,
                    job: job.as_ref().map(Job::summary),
                })
            })
            .collect()
    }

    pub fn list_for_job(
        &self,
        principal: &Principal,
        job_id: &JobId,
    ) -> Result<Vec<Application>, ServiceError> {
        require_role(Some(principal), &[Role::Employer])?;
        let job = self.job(job_id)?;
        assert_owner(&job, principal, "view applications for this job")?;
        Ok(self.store.applications_by_job(&job.id)?)
    }

    fn application(&self, id: &ApplicationId) -> Result<Application, ServiceError> {
        self.store
            .fetch_application(id)?
            .ok_or(ServiceError::NotFound("application"))
    }

    fn job(&self, id: &JobId) -> Result<Job, ServiceError> {
        self.store
            .fetch_job(id)?
            .ok_or(ServiceError::NotFound("job"))
    }

    fn notify(&self, event: WorkflowEvent) {
        let kind = event.kind();
        if let Err(err) = self.notifier.dispatch(event) {
            warn!(kind = kind.label(), error = %err, "notification dispatch failed");
        }
    }
}

/// A `NotFound` after the application was read means a concurrent withdrawal.
fn application_gone(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFound("application"),
        other => other.into(),
    }
}
