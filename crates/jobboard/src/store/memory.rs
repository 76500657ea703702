use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::warn;

use super::RepositoryError;
use crate::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationStatus, Rating,
};
use crate::auth::{Principal, PrincipalDirectory, PrincipalId};
use crate::follows::FollowRepository;
use crate::jobs::{Job, JobFilter, JobId, JobRepository};
use crate::notifications::{Notification, NotificationId, NotificationRepository};
use crate::query::{Page, PageRequest};

#[derive(Debug, Default)]
struct StoreState {
    principals: HashMap<PrincipalId, Principal>,
    jobs: HashMap<JobId, Job>,
    applications: HashMap<ApplicationId, Application>,
    applied: HashMap<(JobId, PrincipalId), ApplicationId>,
    following: HashMap<PrincipalId, BTreeSet<PrincipalId>>,
    notifications: HashMap<NotificationId, Notification>,
}

/// Process-local store backing every repository trait.
///
/// All collections sit behind one mutex, so the compound application
/// operations (uniqueness check, write, counter adjustment) are atomic.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a principal resolvable as a follow target.
    pub fn register_principal(&self, principal: Principal) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        state.principals.insert(principal.id.clone(), principal);
        Ok(())
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn newest_jobs_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
}

fn newest_applications_first(applications: &mut [Application]) {
    applications.sort_by(|a, b| (b.applied_at, &b.id).cmp(&(a.applied_at, &a.id)));
}

impl JobRepository for MemoryStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut state = self.state()?;
        if state.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        state.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.state()?.jobs.get(id).cloned())
    }

    fn update_job(&self, mut job: Job) -> Result<Job, RepositoryError> {
        let mut state = self.state()?;
        let stored = state
            .jobs
            .get_mut(&job.id)
            .ok_or(RepositoryError::NotFound)?;
        job.applicant_count = stored.applicant_count;
        *stored = job.clone();
        Ok(job)
    }

    fn delete_job(&self, id: &JobId) -> Result<Job, RepositoryError> {
        self.state()?
            .jobs
            .remove(id)
            .ok_or(RepositoryError::NotFound)
    }

    fn search_jobs(
        &self,
        filter: &JobFilter,
        page: &PageRequest,
    ) -> Result<Page<Job>, RepositoryError> {
        let state = self.state()?;
        let mut matching: Vec<Job> = state
            .jobs
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        drop(state);
        newest_jobs_first(&mut matching);
        Ok(page.apply(matching))
    }

    fn jobs_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Job>, RepositoryError> {
        let state = self.state()?;
        let mut jobs: Vec<Job> = state
            .jobs
            .values()
            .filter(|job| &job.owner_id == owner)
            .cloned()
            .collect();
        drop(state);
        newest_jobs_first(&mut jobs);
        Ok(jobs)
    }
}

impl ApplicationRepository for MemoryStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<(Application, u32), RepositoryError> {
        let mut state = self.state()?;
        let key = (application.job_id.clone(), application.applicant_id.clone());
        if state.applied.contains_key(&key) || state.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        let job = state
            .jobs
            .get_mut(&application.job_id)
            .ok_or(RepositoryError::NotFound)?;
        job.applicant_count += 1;
        let count = job.applicant_count;

        state.applied.insert(key, application.id.clone());
        state
            .applications
            .insert(application.id.clone(), application.clone());
        Ok((application, count))
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self.state()?.applications.get(id).cloned())
    }

    fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<(Application, ApplicationStatus), RepositoryError> {
        let mut state = self.state()?;
        let stored = state
            .applications
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        let previous = std::mem::replace(&mut stored.status, status);
        stored.updated_at = at;
        Ok((stored.clone(), previous))
    }

    fn set_application_rating(
        &self,
        id: &ApplicationId,
        rating: Rating,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        let mut state = self.state()?;
        let stored = state
            .applications
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        stored.rating = Some(rating);
        stored.rating_comment = comment;
        stored.updated_at = at;
        Ok(stored.clone())
    }

    fn remove_application(
        &self,
        id: &ApplicationId,
    ) -> Result<(Application, Option<u32>), RepositoryError> {
        let mut state = self.state()?;
        let application = state
            .applications
            .remove(id)
            .ok_or(RepositoryError::NotFound)?;
        state.applied.remove(&(
            application.job_id.clone(),
            application.applicant_id.clone(),
        ));

        let count = state.jobs.get_mut(&application.job_id).map(|job| {
            if job.applicant_count == 0 {
                warn!(
                    job_id = %job.id,
                    application_id = %application.id,
                    "applicant count already zero; clamping"
                );
            }
            job.applicant_count = job.applicant_count.saturating_sub(1);
            job.applicant_count
        });
        Ok((application, count))
    }

    fn applications_by_applicant(
        &self,
        applicant: &PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let state = self.state()?;
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|application| &application.applicant_id == applicant)
            .cloned()
            .collect();
        drop(state);
        newest_applications_first(&mut applications);
        Ok(applications)
    }

    fn applications_by_job(&self, job: &JobId) -> Result<Vec<Application>, RepositoryError> {
        let state = self.state()?;
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|application| &application.job_id == job)
            .cloned()
            .collect();
        drop(state);
        newest_applications_first(&mut applications);
        Ok(applications)
    }
}

impl FollowRepository for MemoryStore {
    fn add_follow(
        &self,
        seeker: &PrincipalId,
        company: &PrincipalId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let following = state.following.entry(seeker.clone()).or_default();
        if following.insert(company.clone()) {
            Ok(())
        } else {
            Err(RepositoryError::Conflict)
        }
    }

    fn remove_follow(
        &self,
        seeker: &PrincipalId,
        company: &PrincipalId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let removed = state
            .following
            .get_mut(seeker)
            .is_some_and(|following| following.remove(company));
        if removed {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn followers_of(&self, company: &PrincipalId) -> Result<Vec<PrincipalId>, RepositoryError> {
        let state = self.state()?;
        let mut followers: Vec<PrincipalId> = state
            .following
            .iter()
            .filter(|(_, following)| following.contains(company))
            .map(|(seeker, _)| seeker.clone())
            .collect();
        followers.sort();
        Ok(followers)
    }

    fn following_of(&self, seeker: &PrincipalId) -> Result<Vec<PrincipalId>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .following
            .get(seeker)
            .map(|following| following.iter().cloned().collect())
            .unwrap_or_default())
    }
}

impl NotificationRepository for MemoryStore {
    fn insert_notification(
        &self,
        notification: Notification,
    ) -> Result<Notification, RepositoryError> {
        let mut state = self.state()?;
        if state.notifications.contains_key(&notification.id) {
            return Err(RepositoryError::Conflict);
        }
        state
            .notifications
            .insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    fn fetch_notification(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, RepositoryError> {
        Ok(self.state()?.notifications.get(id).cloned())
    }

    fn mark_notification_read(
        &self,
        id: &NotificationId,
    ) -> Result<Notification, RepositoryError> {
        let mut state = self.state()?;
        let notification = state
            .notifications
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        notification.read = true;
        Ok(notification.clone())
    }

    fn mark_all_notifications_read(
        &self,
        recipient: &PrincipalId,
    ) -> Result<usize, RepositoryError> {
        let mut state = self.state()?;
        let mut updated = 0;
        for notification in state
            .notifications
            .values_mut()
            .filter(|notification| &notification.recipient_id == recipient && !notification.read)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    fn delete_notification(&self, id: &NotificationId) -> Result<Notification, RepositoryError> {
        self.state()?
            .notifications
            .remove(id)
            .ok_or(RepositoryError::NotFound)
    }

    fn notifications_for(
        &self,
        recipient: &PrincipalId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let state = self.state()?;
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|notification| &notification.recipient_id == recipient)
            .cloned()
            .collect();
        drop(state);
        notifications.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(notifications)
    }
}

impl PrincipalDirectory for MemoryStore {
    fn lookup(&self, id: &PrincipalId) -> Result<Option<Principal>, RepositoryError> {
        Ok(self.state()?.principals.get(id).cloned())
    }
}
