/// Cloudflare Pages integration
///
/// Credentials are `accountId:apiToken`, or a bare token when an account
/// id is configured. Deployments are addressed by project, so ids handed
/// out by this adapter are `projectName:deploymentId`.
pub mod client;
pub mod types;

pub use client::CloudflarePagesAdapter;
