use super::domain::{Job, JobFilter, JobId};
use crate::auth::PrincipalId;
use crate::query::{Page, PageRequest};
use crate::store::RepositoryError;

/// Storage abstraction for postings.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// Replace the stored posting and return it. The stored `applicant_count` is
    /// kept; only the counted application operations move it.
    fn update_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn delete_job(&self, id: &JobId) -> Result<Job, RepositoryError>;
    /// Matching jobs, newest first, sliced to the requested page.
    fn search_jobs(&self, filter: &JobFilter, page: &PageRequest)
        -> Result<Page<Job>, RepositoryError>;
    fn jobs_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Job>, RepositoryError>;
}
