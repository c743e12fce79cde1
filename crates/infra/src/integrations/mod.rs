//! Deployment platform adapters
//!
//! Each platform module maps its REST API onto the normalized domain
//! types behind [`deploywatch_core::PlatformAdapter`]. [`PlatformRegistry`]
//! builds them by name.

pub mod cloudflare_pages;
pub mod netlify;
pub mod registry;
pub(crate) mod support;
pub mod vercel;

pub use cloudflare_pages::CloudflarePagesAdapter;
pub use netlify::NetlifyAdapter;
pub use registry::PlatformRegistry;
pub use vercel::VercelAdapter;
