use chrono::{DateTime, Utc};

use super::domain::{Application, ApplicationId, ApplicationStatus, Rating};
use crate::auth::PrincipalId;
use crate::jobs::JobId;
use crate::store::RepositoryError;

/// Storage abstraction for applications.
///
/// Creation and removal are compound: the `(job_id, applicant_id)` uniqueness
/// check, the write and the parent job's `applicant_count` adjustment happen as
/// one atomic step.
pub trait ApplicationRepository: Send + Sync {
    /// Insert and increment the job's counter. `Conflict` when the pair already
    /// applied, `NotFound` when the job is gone. Returns the new count.
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<(Application, u32), RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    /// Set only the status and `updated_at`; returns the record and the status
    /// it replaced.
    fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<(Application, ApplicationStatus), RepositoryError>;
    /// Set only the rating, its comment and `updated_at`.
    fn set_application_rating(
        &self,
        id: &ApplicationId,
        rating: Rating,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError>;
    /// Delete and decrement the job's counter. The count is `None` when the job
    /// no longer exists.
    fn remove_application(
        &self,
        id: &ApplicationId,
    ) -> Result<(Application, Option<u32>), RepositoryError>;
    fn applications_by_applicant(
        &self,
        applicant: &PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn applications_by_job(&self, job: &JobId) -> Result<Vec<Application>, RepositoryError>;
}
