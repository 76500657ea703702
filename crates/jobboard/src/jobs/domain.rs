use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Owned, PrincipalId};
use crate::error::ServiceError;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl JobId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn generate() -> Self {
        let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("job-{id:06}"))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase alphanumerics only, so `Full-time`, `FullTime` and `full_time` compare equal.
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time", alias = "FullTime")]
    FullTime,
    #[serde(rename = "Part-time", alias = "PartTime")]
    PartTime,
    Contract,
    Temporary,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Temporary,
        JobType::Internship,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Temporary => "Temporary",
            JobType::Internship => "Internship",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let key = normalize(raw);
        Self::ALL
            .into_iter()
            .find(|candidate| normalize(candidate.label()) == key)
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "jobType '{raw}' must be one of Full-time, Part-time, Contract, Temporary, Internship"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Executive,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Mid => "Mid",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Executive => "Executive",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let key = normalize(raw);
        Self::ALL
            .into_iter()
            .find(|candidate| normalize(candidate.label()) == key)
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "experienceLevel '{raw}' must be one of Entry, Mid, Senior, Executive"
                ))
            })
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(default)]
    pub min: Option<u64>,
    #[serde(default)]
    pub max: Option<u64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl SalaryRange {
    fn validate(&self) -> Result<(), ServiceError> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(ServiceError::validation(
                    "salary.min must not exceed salary.max",
                ));
            }
        }
        Ok(())
    }
}

/// A posting owned by an employer principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub owner_id: PrincipalId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryRange>,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Non-withdrawn applications; adjusted only by the store's counted operations.
    pub applicant_count: u32,
    pub is_active: bool,
    pub is_featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Job {
    fn owner_id(&self) -> &PrincipalId {
        &self.owner_id
    }
}

impl Job {
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            location: self.location.clone(),
            is_active: self.is_active,
        }
    }
}

/// Compact projection embedded in applicant-facing listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: JobId,
    pub owner_id: PrincipalId,
    pub title: String,
    pub location: String,
    pub is_active: bool,
}

fn require_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Client payload for a new posting. Enum fields stay raw so they can be
/// validated against their closed sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub experience_level: String,
    pub salary: Option<SalaryRange>,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub category: Option<String>,
    pub is_featured: bool,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl JobDraft {
    pub fn into_job(self, owner_id: PrincipalId, now: DateTime<Utc>) -> Result<Job, ServiceError> {
        let title = require_text("title", &self.title)?;
        let description = require_text("description", &self.description)?;
        let location = require_text("location", &self.location)?;
        let job_type = JobType::parse(&require_text("jobType", &self.job_type)?)?;
        let experience_level =
            ExperienceLevel::parse(&require_text("experienceLevel", &self.experience_level)?)?;
        if let Some(salary) = &self.salary {
            salary.validate()?;
        }

        Ok(Job {
            id: JobId::generate(),
            owner_id,
            title,
            description,
            location,
            job_type,
            experience_level,
            salary: self.salary,
            requirements: self.requirements,
            responsibilities: self.responsibilities,
            category: self.category.filter(|value| !value.trim().is_empty()),
            applicant_count: 0,
            is_active: true,
            is_featured: self.is_featured,
            expiry_date: self.expiry_date,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary: Option<SalaryRange>,
    pub requirements: Option<Vec<String>>,
    pub responsibilities: Option<Vec<String>>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl JobPatch {
    /// Merge into `job`, validating before any field is written.
    pub fn apply(self, job: &mut Job, now: DateTime<Utc>) -> Result<(), ServiceError> {
        let title = self
            .title
            .map(|value| require_text("title", &value))
            .transpose()?;
        let description = self
            .description
            .map(|value| require_text("description", &value))
            .transpose()?;
        let location = self
            .location
            .map(|value| require_text("location", &value))
            .transpose()?;
        let job_type = self.job_type.as_deref().map(JobType::parse).transpose()?;
        let experience_level = self
            .experience_level
            .as_deref()
            .map(ExperienceLevel::parse)
            .transpose()?;
        if let Some(salary) = &self.salary {
            salary.validate()?;
        }

        if let Some(title) = title {
            job.title = title;
        }
        if let Some(description) = description {
            job.description = description;
        }
        if let Some(location) = location {
            job.location = location;
        }
        if let Some(job_type) = job_type {
            job.job_type = job_type;
        }
        if let Some(level) = experience_level {
            job.experience_level = level;
        }
        if let Some(salary) = self.salary {
            job.salary = Some(salary);
        }
        if let Some(requirements) = self.requirements {
            job.requirements = requirements;
        }
        if let Some(responsibilities) = self.responsibilities {
            job.responsibilities = responsibilities;
        }
        if let Some(category) = self.category {
            job.category = Some(category).filter(|value| !value.trim().is_empty());
        }
        if let Some(active) = self.is_active {
            job.is_active = active;
        }
        if let Some(featured) = self.is_featured {
            job.is_featured = featured;
        }
        if let Some(expiry) = self.expiry_date {
            job.expiry_date = Some(expiry);
        }
        job.updated_at = now;
        Ok(())
    }
}

/// Raw listing query as received from the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Conjunction of optional predicates; only active jobs ever match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_lowercase())
        .filter(|raw| !raw.is_empty())
}

impl JobFilter {
    pub fn from_query(query: &JobQuery) -> Result<Self, ServiceError> {
        let job_type = non_blank(query.job_type.clone())
            .map(|raw| JobType::parse(&raw))
            .transpose()?;
        let experience_level = non_blank(query.experience_level.clone())
            .map(|raw| ExperienceLevel::parse(&raw))
            .transpose()?;

        Ok(Self {
            search: non_blank(query.search.clone()),
            location: non_blank(query.location.clone()),
            job_type,
            experience_level,
        })
    }

    pub fn matches(&self, job: &Job) -> bool {
        if !job.is_active {
            return false;
        }
        if let Some(search) = &self.search {
            let in_title = job.title.to_lowercase().contains(search);
            let in_description = job.description.to_lowercase().contains(search);
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(location) {
                return false;
            }
        }
        if self.job_type.is_some_and(|job_type| job_type != job.job_type) {
            return false;
        }
        if self
            .experience_level
            .is_some_and(|level| level != job.experience_level)
        {
            return false;
        }
        true
    }
}
