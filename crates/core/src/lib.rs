//! # deploywatch core
//!
//! Platform-agnostic deployment logic - no HTTP or platform code.
//!
//! This crate contains:
//! - Port interfaces for platform adapters and credential lookup
//! - The deployment watch state machine
//! - Deployment comparison and build log analysis
//! - `DeploymentIntelligence`, the per-platform service the tool layer
//!   talks to
//!
//! ## Architecture Principles
//! - Only depends on `deploywatch-domain`
//! - All platform access goes through [`PlatformAdapter`]
//! - Time-driven logic uses tokio time so tests can pause the clock

pub mod intelligence;
pub mod platform;

pub use intelligence::{
    DeploymentIntelligence, DeploymentWatch, WatchRequest, WatchSettings, WatchStep,
};
pub use platform::ports::{AdapterFactory, CredentialSource, NoCredentials, PlatformAdapter};
