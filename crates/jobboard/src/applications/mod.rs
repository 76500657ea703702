//! Applications: submission, employer triage and rating, withdrawal.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantApplicationView, Application, ApplicationId, ApplicationStatus,
    ApplicationSubmission, Rating,
};
pub use repository::ApplicationRepository;
pub use router::{application_router, RatingRequest, StatusChange};
pub use service::ApplicationService;
