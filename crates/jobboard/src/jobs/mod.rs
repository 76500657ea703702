//! Job postings: creation, owner-only edits, and the public listing.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ExperienceLevel, Job, JobDraft, JobFilter, JobId, JobPatch, JobQuery, JobSummary, JobType,
    SalaryRange,
};
pub use repository::JobRepository;
pub use router::job_router;
pub use service::JobService;
