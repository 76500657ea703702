use std::sync::Arc;

use tracing::{info, warn};

use super::repository::FollowRepository;
use crate::auth::{require_role, Principal, PrincipalDirectory, PrincipalId, Role};
use crate::error::ServiceError;
use crate::notifications::{NotificationSink, WorkflowEvent};
use crate::store::RepositoryError;

/// Seeker -> company follow edges.
pub struct FollowService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> FollowService<S, N>
where
    S: FollowRepository + PrincipalDirectory + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    pub fn follow(&self, principal: &Principal, company: &PrincipalId) -> Result<(), ServiceError> {
        require_role(Some(principal), &[Role::Seeker])
            .map_err(|_| ServiceError::forbidden("only job seekers can follow companies"))?;
        let target = self
            .store
            .lookup(company)?
            .filter(|candidate| candidate.has_role(Role::Employer))
            .ok_or(ServiceError::NotFound("company"))?;

        self.store
            .add_follow(&principal.id, &target.id)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ServiceError::conflict("already following this company")
                }
                other => other.into(),
            })?;
        info!(seeker = %principal.id, company = %target.id, "company followed");

        let event = WorkflowEvent::CompanyFollowed {
            company: target.id.clone(),
            seeker: principal.id.clone(),
            seeker_name: principal.display_name.clone(),
        };
        if let Err(err) = self.notifier.dispatch(event) {
            warn!(company = %target.id, error = %err, "company_followed notification not queued");
        }
        Ok(())
    }

    /// Removing an edge that does not exist is a `Conflict`, not a no-op.
    pub fn unfollow(
        &self,
        principal: &Principal,
        company: &PrincipalId,
    ) -> Result<(), ServiceError> {
        require_role(Some(principal), &[Role::Seeker])?;
        self.store
            .remove_follow(&principal.id, company)
            .map_err(|err| match err {
                RepositoryError::NotFound => ServiceError::conflict("not following this company"),
                other => other.into(),
            })?;
        info!(seeker = %principal.id, company = %company, "company unfollowed");
        Ok(())
    }

    pub fn following(&self, principal: &Principal) -> Result<Vec<PrincipalId>, ServiceError> {
        require_role(Some(principal), &[Role::Seeker])?;
        Ok(self.store.following_of(&principal.id)?)
    }
}
