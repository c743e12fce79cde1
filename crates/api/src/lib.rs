//! # deploywatch API
//!
//! Tool-invocation layer and stdio entry point.
//!
//! This crate contains:
//! - `ToolHandler`, which owns the cache of per-platform
//!   `DeploymentIntelligence` instances
//! - The five deployment tools and their JSON-schema descriptors
//! - The newline-delimited JSON transport used by the `deploywatch` binary
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires HTTP adapters and environment credentials into the core services
//! - Emits plain JSON data; presentation is left to the caller

pub mod commands;
pub mod context;
pub mod server;
pub mod utils;

// Re-export for convenience
pub use commands::{ToolDescriptor, ToolOutput};
pub use context::ToolHandler;
pub use server::{respond, serve, ToolRequest, ToolResponse};
