//! Follow relation between seekers and employer companies.

pub mod repository;
pub mod router;
pub mod service;

pub use repository::FollowRepository;
pub use router::follow_router;
pub use service::FollowService;
