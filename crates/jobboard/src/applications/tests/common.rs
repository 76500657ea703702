use std::sync::{Arc, Mutex};

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationService, ApplicationStatus, Rating,
};
use crate::auth::{AccountRecord, CredentialVerifier, Principal, PrincipalId, StaticTokenVerifier};
use crate::jobs::{Job, JobDraft, JobFilter, JobId, JobRepository};
use crate::notifications::{DispatchError, NotificationSink, WorkflowEvent};
use crate::query::{Page, PageRequest};
use crate::store::{MemoryStore, RepositoryError};

pub(super) const SEEKER_TOKEN: &str = "seeker-token";
pub(super) const EMPLOYER_TOKEN: &str = "employer-token";
pub(super) const RIVAL_TOKEN: &str = "rival-token";

pub(super) fn seeker() -> Principal {
    Principal::seeker("u1", "Sam Seeker")
}

pub(super) fn employer() -> Principal {
    Principal::employer("u2", "Acme Hiring")
}

pub(super) fn rival() -> Principal {
    Principal::employer("u3", "Globex")
}

pub(super) fn post_job(store: &MemoryStore, owner: &Principal) -> Job {
    let job = JobDraft {
        title: "Backend Engineer".to_string(),
        description: "Own the hiring pipeline services".to_string(),
        location: "Des Moines, IA".to_string(),
        job_type: "Full-time".to_string(),
        experience_level: "Mid".to_string(),
        ..JobDraft::default()
    }
    .into_job(owner.id.clone(), Utc::now())
    .expect("valid draft");
    store.insert_job(job).expect("job stored")
}

pub(super) fn build_service() -> (
    ApplicationService<MemoryStore, RecordingSink>,
    Arc<MemoryStore>,
    Arc<RecordingSink>,
) {
    let store = Arc::new(MemoryStore::default());
    let sink = Arc::new(RecordingSink::default());
    let service = ApplicationService::new(store.clone(), sink.clone());
    (service, store, sink)
}

pub(super) fn verifier() -> Arc<dyn CredentialVerifier> {
    let account = |token: &str, principal: Principal| AccountRecord {
        token: token.to_string(),
        id: principal.id.0.clone(),
        role: principal.role,
        display_name: principal.display_name,
    };
    let verifier = StaticTokenVerifier::from_accounts(vec![
        account(SEEKER_TOKEN, seeker()),
        account(EMPLOYER_TOKEN, employer()),
        account(RIVAL_TOKEN, rival()),
    ])
    .expect("unique tokens");
    Arc::new(verifier)
}

pub(super) fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header"),
    );
    headers
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[derive(Default)]
pub(super) struct RecordingSink {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl RecordingSink {
    pub(super) fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().expect("sink mutex poisoned").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn dispatch(&self, event: WorkflowEvent) -> Result<(), DispatchError> {
        self.events.lock().expect("sink mutex poisoned").push(event);
        Ok(())
    }
}

/// Sink whose queue is always full.
pub(super) struct FailingSink;

impl NotificationSink for FailingSink {
    fn dispatch(&self, _event: WorkflowEvent) -> Result<(), DispatchError> {
        Err(DispatchError::QueueFull)
    }
}

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("offline".to_string()))
}

impl JobRepository for UnavailableStore {
    fn insert_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        offline()
    }

    fn fetch_job(&self, _id: &JobId) -> Result<Option<Job>, RepositoryError> {
        offline()
    }

    fn update_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        offline()
    }

    fn delete_job(&self, _id: &JobId) -> Result<Job, RepositoryError> {
        offline()
    }

    fn search_jobs(
        &self,
        _filter: &JobFilter,
        _page: &PageRequest,
    ) -> Result<Page<Job>, RepositoryError> {
        offline()
    }

    fn jobs_by_owner(&self, _owner: &PrincipalId) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }
}

impl ApplicationRepository for UnavailableStore {
    fn insert_application(
        &self,
        _application: Application,
    ) -> Result<(Application, u32), RepositoryError> {
        offline()
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn set_application_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
        _at: DateTime<Utc>,
    ) -> Result<(Application, ApplicationStatus), RepositoryError> {
        offline()
    }

    fn set_application_rating(
        &self,
        _id: &ApplicationId,
        _rating: Rating,
        _comment: Option<String>,
        _at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        offline()
    }

    fn remove_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<(Application, Option<u32>), RepositoryError> {
        offline()
    }

    fn applications_by_applicant(
        &self,
        _applicant: &PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }

    fn applications_by_job(&self, _job: &JobId) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }
}

type Hook = Box<dyn FnOnce() + Send>;

/// `MemoryStore` wrapper that runs a hook right after the next application
/// read, so another request can land between a workflow's read and its write.
pub(super) struct InterleavingStore {
    inner: Arc<MemoryStore>,
    after_read: Mutex<Option<Hook>>,
}

impl InterleavingStore {
    pub(super) fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            after_read: Mutex::new(None),
        }
    }

    pub(super) fn after_next_read(&self, hook: impl FnOnce() + Send + 'static) {
        *self.after_read.lock().expect("hook mutex poisoned") = Some(Box::new(hook));
    }
}

impl JobRepository for InterleavingStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.inner.insert_job(job)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        self.inner.fetch_job(id)
    }

    fn update_job(&self, job: Job) -> Result<Job, RepositoryError> {
        self.inner.update_job(job)
    }

    fn delete_job(&self, id: &JobId) -> Result<Job, RepositoryError> {
        self.inner.delete_job(id)
    }

    fn search_jobs(
        &self,
        filter: &JobFilter,
        page: &PageRequest,
    ) -> Result<Page<Job>, RepositoryError> {
        self.inner.search_jobs(filter, page)
    }

    fn jobs_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Job>, RepositoryError> {
        self.inner.jobs_by_owner(owner)
    }
}

impl ApplicationRepository for InterleavingStore {
    fn insert_application(
        &self,
        application: Application,
    ) -> Result<(Application, u32), RepositoryError> {
        self.inner.insert_application(application)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let found = self.inner.fetch_application(id)?;
        let hook = self.after_read.lock().expect("hook mutex poisoned").take();
        if let Some(hook) = hook {
            hook();
        }
        Ok(found)
    }

    fn set_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<(Application, ApplicationStatus), RepositoryError> {
        self.inner.set_application_status(id, status, at)
    }

    fn set_application_rating(
        &self,
        id: &ApplicationId,
        rating: Rating,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        self.inner.set_application_rating(id, rating, comment, at)
    }

    fn remove_application(
        &self,
        id: &ApplicationId,
    ) -> Result<(Application, Option<u32>), RepositoryError> {
        self.inner.remove_application(id)
    }

    fn applications_by_applicant(
        &self,
        applicant: &PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications_by_applicant(applicant)
    }

    fn applications_by_job(&self, job: &JobId) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications_by_job(job)
    }
}
