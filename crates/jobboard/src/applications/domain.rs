use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Owned, PrincipalId};
use crate::error::ServiceError;
use crate::jobs::{JobId, JobSummary};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl ApplicationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn generate() -> Self {
        let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("app-{id:06}"))
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat status set. Any status may follow any other, including leaving
/// `Rejected` or `Accepted`; the machine only restricts the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Reviewed,
    Interview,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Interview,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Reviewed => "Reviewed",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Accepted => "Accepted",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(raw))
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "status '{raw}' must be one of Applied, Reviewed, Interview, Rejected, Accepted"
                ))
            })
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Employer rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn new(value: i64) -> Result<Self, ServiceError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ServiceError::validation("rating must be between 1 and 5"))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ServiceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// One seeker's application to one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: PrincipalId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    /// Opaque résumé URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_ref: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_comment: Option<String>,
}

/// The applicant owns the application; the employer governs it through the
/// parent job.
impl Owned for Application {
    fn owner_id(&self) -> &PrincipalId {
        &self.applicant_id
    }
}

/// Client payload for `submitApplication`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationSubmission {
    pub job_id: String,
    pub cover_letter: Option<String>,
    #[serde(alias = "resume")]
    pub resume_ref: Option<String>,
}

impl ApplicationSubmission {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.0.clone(),
            ..Self::default()
        }
    }

    pub fn with_cover_letter(mut self, cover_letter: impl Into<String>) -> Self {
        self.cover_letter = Some(cover_letter.into());
        self
    }

    pub fn with_resume(mut self, resume_ref: impl Into<String>) -> Self {
        self.resume_ref = Some(resume_ref.into());
        self
    }

    pub(crate) fn job_id(&self) -> Result<JobId, ServiceError> {
        let raw = self.job_id.trim();
        if raw.is_empty() {
            Err(ServiceError::validation("please provide a job ID"))
        } else {
            Ok(JobId::new(raw))
        }
    }

    pub(crate) fn into_application(
        self,
        job_id: JobId,
        applicant_id: PrincipalId,
        now: DateTime<Utc>,
    ) -> Application {
        Application {
            id: ApplicationId::generate(),
            job_id,
            applicant_id,
            cover_letter: self.cover_letter.filter(|text| !text.trim().is_empty()),
            resume_ref: self.resume_ref.filter(|text| !text.trim().is_empty()),
            status: ApplicationStatus::Applied,
            applied_at: now,
            updated_at: now,
            rating: None,
            rating_comment: None,
        }
    }
}

/// Applicant-facing row: the application plus the job it points at, when that
/// job still exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<JobSummary>,
}
