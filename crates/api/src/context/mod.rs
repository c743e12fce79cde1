//! Tool handler context - dependency wiring and the instance cache

use std::sync::Arc;

use deploywatch_common::cache::{spawn_sweeper, Cache, CacheConfig, SweeperHandle};
use deploywatch_common::resilience::{Clock, SystemClock};
use deploywatch_core::{
    AdapterFactory, CredentialSource, DeploymentIntelligence, WatchSettings,
};
use deploywatch_domain::{Config, Result};
use deploywatch_infra::{EnvCredentials, PlatformRegistry};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Entry point for tool calls.
///
/// Holds one [`DeploymentIntelligence`] per platform in a TTL/LRU cache.
/// Instances idle longer than the configured TTL are dropped by a
/// background sweeper, so a handler must be created inside a tokio runtime.
pub struct ToolHandler<C = SystemClock>
where
    C: Clock + Clone,
{
    config: Config,
    factory: Arc<dyn AdapterFactory>,
    credentials: Arc<dyn CredentialSource>,
    instances: Cache<String, Arc<DeploymentIntelligence>, C>,
    sweeper: Mutex<Option<SweeperHandle>>,
    shutdown: CancellationToken,
}

impl ToolHandler<SystemClock> {
    pub fn new(
        config: Config,
        factory: Arc<dyn AdapterFactory>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self::with_clock(config, factory, credentials, SystemClock)
    }

    /// HTTP adapters for every supported platform, credentials from the
    /// process environment
    pub fn from_config(config: Config) -> Self {
        let factory = Arc::new(PlatformRegistry::new(config.clone()));
        Self::new(config, factory, Arc::new(EnvCredentials::new()))
    }
}

impl<C> ToolHandler<C>
where
    C: Clock + Clone,
{
    pub fn with_clock(
        config: Config,
        factory: Arc<dyn AdapterFactory>,
        credentials: Arc<dyn CredentialSource>,
        clock: C,
    ) -> Self {
        let cache_config = CacheConfig::ttl_lru(config.cache.ttl(), config.cache.max_size);
        let instances = Cache::with_clock(cache_config, clock);
        let sweeper = spawn_sweeper(instances.clone(), config.cache.cleanup_interval());

        info!(
            max_size = config.cache.max_size,
            ttl_secs = config.cache.ttl_secs,
            "Tool handler ready"
        );

        Self {
            config,
            factory,
            credentials,
            instances,
            sweeper: Mutex::new(Some(sweeper)),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Platform names accepted by the tools
    pub fn supported_platforms(&self) -> Vec<&'static str> {
        self.factory.supported_platforms()
    }

    /// Cached intelligence for `platform`.
    ///
    /// A missing or idle-expired instance is rebuilt through the adapter
    /// factory; an unknown platform is an error and caches nothing.
    pub fn intelligence(&self, platform: &str) -> Result<Arc<DeploymentIntelligence>> {
        self.instances.try_get_or_insert_with(platform.to_string(), || {
            let adapter = self.factory.create(platform)?;
            debug!(platform, "Creating deployment intelligence");
            let intelligence = DeploymentIntelligence::new(adapter, Arc::clone(&self.credentials))
                .with_watch_settings(WatchSettings::from(&self.config.watch));
            Ok(Arc::new(intelligence))
        })
    }

    /// Number of cached instances, idle ones included until swept
    pub fn cached_instances(&self) -> usize {
        self.instances.len()
    }

    /// Whether a live instance exists for `platform`
    pub fn is_cached(&self, platform: &str) -> bool {
        self.instances.contains_key(&platform.to_string())
    }

    /// Token for a new watch; cancelled when the handler is disposed
    pub(crate) fn watch_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Stop the sweeper, cancel running watches and drop every cached
    /// instance. Safe to call more than once.
    pub async fn dispose(&self) {
        self.shutdown.cancel();
        let sweeper = self.sweeper.lock().take();
        if let Some(sweeper) = sweeper {
            sweeper.stop().await;
        }
        self.instances.clear();
        info!("Tool handler disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl<C> std::fmt::Debug for ToolHandler<C>
where
    C: Clock + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolHandler")
            .field("cached_instances", &self.instances.len())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
