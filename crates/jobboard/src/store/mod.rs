//! Persistence boundary shared by every component repository.

pub mod memory;

pub use memory::MemoryStore;

use crate::applications::ApplicationRepository;
use crate::auth::PrincipalDirectory;
use crate::follows::FollowRepository;
use crate::jobs::JobRepository;
use crate::notifications::NotificationRepository;

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// A single backend able to serve the whole board.
pub trait BoardStore:
    JobRepository
    + ApplicationRepository
    + FollowRepository
    + NotificationRepository
    + PrincipalDirectory
    + 'static
{
}

impl<T> BoardStore for T where
    T: JobRepository
        + ApplicationRepository
        + FollowRepository
        + NotificationRepository
        + PrincipalDirectory
        + 'static
{
}
