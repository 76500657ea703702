pub mod api;
pub mod applications;
pub mod auth;
pub mod board;
pub mod config;
pub mod error;
pub mod follows;
pub mod jobs;
pub mod notifications;
pub mod query;
pub mod store;
pub mod telemetry;

pub use board::Board;
pub use error::{AppError, ServiceError};
pub use store::{BoardStore, MemoryStore, RepositoryError};
