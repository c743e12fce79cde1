//! Deployment intelligence: watching, comparing and diagnosing deployments

pub mod compare;
pub mod logs;
pub mod service;
pub mod watch;

pub use service::DeploymentIntelligence;
pub use watch::{DeploymentWatch, WatchRequest, WatchSettings, WatchStep};
