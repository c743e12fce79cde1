/// Netlify integration
///
/// Projects are Netlify sites. Deploy lists need a site id, so site names
/// are resolved through `/sites` first. Build logs are fetched from the
/// deploy's `log_access_attributes.url`.
pub mod client;
pub mod types;

pub use client::NetlifyAdapter;
