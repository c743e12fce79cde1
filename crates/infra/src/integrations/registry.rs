//! Adapter registry keyed by platform name

use std::sync::Arc;

use deploywatch_core::{AdapterFactory, PlatformAdapter};
use deploywatch_domain::constants::{
    PLATFORM_CLOUDFLARE_PAGES, PLATFORM_NETLIFY, PLATFORM_VERCEL, SUPPORTED_PLATFORMS,
};
use deploywatch_domain::{Config, DeployError, Result};
use tracing::debug;

use super::cloudflare_pages::CloudflarePagesAdapter;
use super::netlify::NetlifyAdapter;
use super::vercel::VercelAdapter;

/// Builds the HTTP-backed adapter for each supported platform
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    config: Config,
}

impl PlatformRegistry {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl AdapterFactory for PlatformRegistry {
    fn create(&self, platform: &str) -> Result<Arc<dyn PlatformAdapter>> {
        debug!(platform, "Creating platform adapter");
        let adapter: Arc<dyn PlatformAdapter> = match platform {
            PLATFORM_VERCEL => Arc::new(VercelAdapter::from_config(&self.config)?),
            PLATFORM_NETLIFY => Arc::new(NetlifyAdapter::from_config(&self.config)?),
            PLATFORM_CLOUDFLARE_PAGES => Arc::new(CloudflarePagesAdapter::from_config(&self.config)?),
            other => {
                return Err(DeployError::InvalidInput(format!(
                    "Unknown platform: {other}. Supported platforms: {}",
                    SUPPORTED_PLATFORMS.join(", ")
                )))
            }
        };
        Ok(adapter)
    }

    fn supported_platforms(&self) -> Vec<&'static str> {
        SUPPORTED_PLATFORMS.to_vec()
    }
}
