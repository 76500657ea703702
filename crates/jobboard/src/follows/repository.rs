use crate::auth::PrincipalId;
use crate::store::RepositoryError;

/// Seeker -> company edges, stored as the seeker's following set.
pub trait FollowRepository: Send + Sync {
    /// `Conflict` when the edge already exists.
    fn add_follow(&self, seeker: &PrincipalId, company: &PrincipalId)
        -> Result<(), RepositoryError>;
    /// `NotFound` when there is no such edge.
    fn remove_follow(
        &self,
        seeker: &PrincipalId,
        company: &PrincipalId,
    ) -> Result<(), RepositoryError>;
    /// Every seeker whose following set contains `company`, at call time.
    fn followers_of(&self, company: &PrincipalId) -> Result<Vec<PrincipalId>, RepositoryError>;
    fn following_of(&self, seeker: &PrincipalId) -> Result<Vec<PrincipalId>, RepositoryError>;
}
