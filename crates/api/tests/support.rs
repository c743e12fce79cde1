//! Shared helpers for tool-layer integration tests

use std::sync::Arc;

use deploywatch_api::ToolHandler;
use deploywatch_domain::{Config, PollIntervals};
use deploywatch_infra::{EnvCredentials, PlatformRegistry};

/// Configuration pointing every platform at `base_url`, with fast retries
/// and short poll intervals.
pub fn mock_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.platforms.vercel_api_url = base_url.to_string();
    config.platforms.netlify_api_url = base_url.to_string();
    config.platforms.cloudflare_api_url = base_url.to_string();
    config.http.retries = 1;
    config.http.base_backoff_ms = 1;
    config.http.max_backoff_ms = 5;
    config.http.jitter_ms = 0;
    config.watch.max_attempts = 10;
    config.watch.intervals = PollIntervals {
        initializing_ms: 10,
        building_ms: 10,
        uploading_ms: 10,
        deploying_ms: 10,
        unknown_ms: 10,
    };
    config
}

/// Handler over real HTTP adapters; credentials come only from `env`
pub fn handler_with_env(base_url: &str, env: &'static [(&'static str, &'static str)]) -> ToolHandler {
    let config = mock_config(base_url);
    let registry = Arc::new(PlatformRegistry::new(config.clone()));
    let credentials = EnvCredentials::with_lookup(move |key| {
        env.iter().find(|(name, _)| *name == key).map(|(_, value)| (*value).to_string())
    });
    ToolHandler::new(config, registry, Arc::new(credentials))
}
