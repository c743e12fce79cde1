/// Vercel integration
///
/// Deployments are listed through `/v6/deployments`, polled through
/// `/v13/deployments/{id}` and their build output is read from the
/// deployment event stream (`stdout`/`stderr` events only).
///
/// # State mapping
///
/// `readyState` is preferred over the legacy `state` field. `QUEUED` and
/// `INITIALIZING` both map to initializing; unrecognized values map to
/// unknown.
pub mod client;
pub mod types;

pub use client::VercelAdapter;
