//! Platform API plumbing shared by every adapter
//!
//! - [`endpoints`]: static endpoint descriptors (path, verb, docs link)
//! - [`errors`]: request error taxonomy with retry classification
//! - [`dedup`]: in-flight request coalescing
//! - [`client`]: rate-limited, deduplicating client on top of
//!   [`crate::http::HttpClient`]

pub mod client;
pub mod dedup;
pub mod endpoints;
pub mod errors;

pub use client::ApiClient;
pub use dedup::InFlightRegistry;
pub use endpoints::{EndpointDescriptor, HttpMethod, RequestTarget};
pub use errors::{ApiError, ApiErrorCategory};
