//! Core domain logic for the Mandalart planner.
//! This crate is the single source of truth for grid topology and plan
//! invariants.

pub mod config;
pub mod db;
pub mod grid;
pub mod logging;
pub mod model;
pub mod recommend;
pub mod repo;
pub mod service;

pub use config::{ConfigError, RecommendConfig};
pub use grid::{
    classify, mirror_owner, place, ActionItems, CellRole, GridError, GridIndex, Placement,
};
pub use logging::{
    default_log_dir, default_log_level, init_logging, logging_status, LogSettings, LoggingError,
};
pub use model::plan::{
    Cell, CellStatus, CellUpdate, Plan, PlanDraft, PlanId, PlanValidationError, PlanWithCells,
};
pub use recommend::{GenerationRequest, ProviderError, TextGenerator};
pub use repo::plan_repo::{PlanRepository, RepoError, RepoResult, SqlitePlanRepository};
pub use service::plan_service::{DisplayCell, PlanProgress, PlanService, PlanServiceError};
pub use service::recommend_service::{Recommendation, RecommendError, RecommendService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
