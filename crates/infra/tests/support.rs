//! Shared helpers for infra integration tests

use deploywatch_domain::{Config, PollIntervals};

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
