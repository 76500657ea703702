use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::applications::{ApplicationId, ApplicationStatus};
use crate::auth::{Owned, PrincipalId};
use crate::jobs::JobId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub String);

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl NotificationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn generate() -> Self {
        let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("ntf-{id:08}"))
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    JobPosted,
    JobApplied,
    ApplicationUpdate,
    CompanyFollowed,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::JobPosted => "job_posted",
            NotificationKind::JobApplied => "job_applied",
            NotificationKind::ApplicationUpdate => "application_update",
            NotificationKind::CompanyFollowed => "company_followed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: PrincipalId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<PrincipalId>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Owned for Notification {
    fn owner_id(&self) -> &PrincipalId {
        &self.recipient_id
    }
}

/// A state change that produces notifications. Recipients are fixed when the
/// event is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    JobPosted {
        employer: PrincipalId,
        employer_name: String,
        job_id: JobId,
        title: String,
        followers: Vec<PrincipalId>,
    },
    JobApplied {
        employer: PrincipalId,
        applicant: PrincipalId,
        applicant_name: String,
        job_id: JobId,
        title: String,
        application_id: ApplicationId,
    },
    ApplicationUpdated {
        applicant: PrincipalId,
        employer: PrincipalId,
        job_id: JobId,
        application_id: ApplicationId,
        status: ApplicationStatus,
    },
    CompanyFollowed {
        company: PrincipalId,
        seeker: PrincipalId,
        seeker_name: String,
    },
}

impl WorkflowEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            WorkflowEvent::JobPosted { .. } => NotificationKind::JobPosted,
            WorkflowEvent::JobApplied { .. } => NotificationKind::JobApplied,
            WorkflowEvent::ApplicationUpdated { .. } => NotificationKind::ApplicationUpdate,
            WorkflowEvent::CompanyFollowed { .. } => NotificationKind::CompanyFollowed,
        }
    }

    pub fn recipients(&self) -> &[PrincipalId] {
        match self {
            WorkflowEvent::JobPosted { followers, .. } => followers,
            WorkflowEvent::JobApplied { employer, .. } => std::slice::from_ref(employer),
            WorkflowEvent::ApplicationUpdated { applicant, .. } => {
                std::slice::from_ref(applicant)
            }
            WorkflowEvent::CompanyFollowed { company, .. } => std::slice::from_ref(company),
        }
    }

    pub fn message(&self) -> String {
        match self {
            WorkflowEvent::JobPosted {
                employer_name,
                title,
                ..
            } => format!("{employer_name} posted a new job: {title}"),
            WorkflowEvent::JobApplied {
                applicant_name,
                title,
                ..
            } => format!("{applicant_name} applied for {title}"),
            WorkflowEvent::ApplicationUpdated { status, .. } => {
                format!("Your application status updated to {status}")
            }
            WorkflowEvent::CompanyFollowed { seeker_name, .. } => {
                format!("{seeker_name} started following your company")
            }
        }
    }

    fn sender(&self) -> &PrincipalId {
        match self {
            WorkflowEvent::JobPosted { employer, .. } => employer,
            WorkflowEvent::JobApplied { applicant, .. } => applicant,
            WorkflowEvent::ApplicationUpdated { employer, .. } => employer,
            WorkflowEvent::CompanyFollowed { seeker, .. } => seeker,
        }
    }

    fn job_id(&self) -> Option<&JobId> {
        match self {
            WorkflowEvent::JobPosted { job_id, .. }
            | WorkflowEvent::JobApplied { job_id, .. }
            | WorkflowEvent::ApplicationUpdated { job_id, .. } => Some(job_id),
            WorkflowEvent::CompanyFollowed { .. } => None,
        }
    }

    fn application_id(&self) -> Option<&ApplicationId> {
        match self {
            WorkflowEvent::JobApplied { application_id, .. }
            | WorkflowEvent::ApplicationUpdated { application_id, .. } => Some(application_id),
            _ => None,
        }
    }

    /// Build the notification addressed to one recipient of this event.
    pub fn notification_for(&self, recipient: &PrincipalId, now: DateTime<Utc>) -> Notification {
        Notification {
            id: NotificationId::generate(),
            recipient_id: recipient.clone(),
            sender_id: Some(self.sender().clone()),
            kind: self.kind(),
            job_id: self.job_id().cloned(),
            application_id: self.application_id().cloned(),
            message: self.message(),
            read: false,
            created_at: now,
        }
    }
}

/// Recipient's inbox with its unread tally.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}
