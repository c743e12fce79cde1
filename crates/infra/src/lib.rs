//! # deploywatch infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The resilient HTTP executor and the rate-limited, deduplicating
//!   platform API client
//! - Vercel, Netlify and Cloudflare Pages adapters plus the registry that
//!   builds them by name
//! - Configuration loading (file + environment)
//! - Environment credential lookup
//!
//! ## Architecture
//! - Implements traits defined in `deploywatch-core`
//! - Depends on `deploywatch-common` and `deploywatch-domain`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use api::{ApiClient, ApiError, EndpointDescriptor};
pub use config::{load, load_from_file};
pub use credentials::EnvCredentials;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RequestOptions};
pub use integrations::{
    CloudflarePagesAdapter, NetlifyAdapter, PlatformRegistry, VercelAdapter,
};
