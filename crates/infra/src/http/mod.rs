//! HTTP request executor
//!
//! The only place in the workspace that talks to `reqwest` directly. Platform
//! adapters go through [`crate::api::ApiClient`], which adds rate limiting
//! and in-flight deduplication on top of [`HttpClient`].

pub mod client;

pub use client::{ApiRetryPolicy, HttpClient, HttpClientBuilder, RequestOptions};
