//! Domain types and models
//!
//! Everything here is plain serializable data. Adapters normalize platform
//! payloads into these shapes and the core services only ever see them.

pub mod analysis;
pub mod comparison;
pub mod deployment;
pub mod watch;

pub use analysis::{ErrorAnalysis, FailureKind, LogFilter, LogReport};
pub use comparison::{BuildTimeDelta, DeploymentComparison, DeploymentSnapshot, RiskLevel};
pub use deployment::{
    CommitInfo, DeploymentOutcome, DeploymentRecord, DeploymentState, DeploymentStatus,
    ProjectSummary,
};
pub use watch::{WatchEvent, WatchEventDetails, WatchEventKind};
