//! # deploywatch domain
//!
//! Plain data shared by every deploywatch crate.
//!
//! This crate contains:
//! - Deployment lifecycle, status and project types
//! - Watch events, deployment comparisons and log analysis results
//! - The cross-layer error type and `Result` alias
//! - Configuration structures with their defaults
//! - Constants (platform names, timing defaults, message texts)
//!
//! ## Architecture
//! - No dependencies on other deploywatch crates
//! - No I/O; every type is serializable data

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
