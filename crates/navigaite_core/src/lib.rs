//! Core domain logic for the NavigAIte planner.
//! Owns the per-user task checklist, the stale-recommendation flag and the
//! atomic replacement of agent-generated tasks.

pub mod cache;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use cache::DashboardCache;
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{
    NewTask, RecommendationItem, RecommendationResource, Resource, Task, TaskId, TaskSource,
};
pub use model::user::{ProfileUpdate, UserRecord, DEFAULT_USER_NAME};
pub use model::validation::ValidationError;
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::dashboard_service::{Dashboard, DashboardService};
pub use service::recommendation_service::{RecommendationBatch, RecommendationService};
pub use service::task_service::TaskService;
pub use service::user_service::UserService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
