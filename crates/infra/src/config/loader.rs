//! Configuration loader
//!
//! Loads configuration from an optional file, then applies environment
//! overrides.
//!
//! ## Loading Strategy
//! 1. An explicit path must exist and parse
//! 2. Without one, probes the working directory and up to two parents
//! 3. Nothing found means defaults
//! 4. `DEPLOYWATCH_*` environment variables override individual keys
//! 5. The result is validated
//!
//! ## Environment Variables
//! - `DEPLOYWATCH_HTTP_TIMEOUT_MS`: per-attempt request timeout
//! - `DEPLOYWATCH_HTTP_RETRIES`: retries after the first attempt
//! - `DEPLOYWATCH_USER_AGENT`: `User-Agent` header value
//! - `DEPLOYWATCH_RATE_LIMIT_PER_MINUTE`: token bucket size and refill rate
//! - `DEPLOYWATCH_WATCH_MAX_ATTEMPTS`: poll budget of a watch
//! - `DEPLOYWATCH_WATCH_MAX_SECS`: wall-clock budget of a watch
//! - `DEPLOYWATCH_CACHE_MAX_SIZE`: adapter-instance cache capacity
//! - `DEPLOYWATCH_CACHE_TTL_SECS`: adapter-instance idle TTL
//! - `DEPLOYWATCH_VERCEL_API_URL`, `DEPLOYWATCH_NETLIFY_API_URL`,
//!   `DEPLOYWATCH_CLOUDFLARE_API_URL`: platform base URLs
//! - `CLOUDFLARE_ACCOUNT_ID`: account used with bare Cloudflare tokens
//!
//! ## File Locations
//! In each of `.`, `..` and `../..`, in order:
//! `deploywatch.toml`, `deploywatch.json`, `config.toml`, `config.json`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use deploywatch_domain::{Config, DeployError, Result};
use tracing::{debug, info};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["deploywatch.toml", "deploywatch.json", "config.toml", "config.json"];
const PARENT_LEVELS: usize = 2;

/// Load configuration from `path` (or a probed file), the process
/// environment and defaults.
///
/// # Errors
/// Returns `DeployError::Config` if:
/// - `path` is given but does not exist
/// - The file format is invalid
/// - An environment override does not parse
/// - The merged configuration fails validation
pub fn load(path: Option<&Path>) -> Result<Config> {
    load_with_env(path, |key| std::env::var(key).ok())
}

/// [`load`] with an explicit environment lookup
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let source = match path {
        Some(path) => Some(path.to_path_buf()),
        None => std::env::current_dir().ok().and_then(|cwd| probe_config_paths(&cwd)),
    };

    let mut config = match source {
        Some(path) => load_from_file(&path)?,
        None => {
            debug!("No config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config, lookup)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// Format is detected by extension (`.toml` or `.json`). Missing keys take
/// their defaults.
///
/// # Errors
/// Returns `DeployError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(DeployError::Config(format!("Config file not found: {}", path.display())));
    }

    info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path).map_err(InfraError::from)?;
    parse_config(&contents, path)
}

/// Parse configuration from string content
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => Ok(toml::from_str(contents).map_err(InfraError::from)?),
        "json" => Ok(serde_json::from_str(contents).map_err(InfraError::from)?),
        _ => Err(DeployError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in `start` or its parents
pub fn probe_config_paths(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(PARENT_LEVELS + 1)
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Apply `DEPLOYWATCH_*` overrides read through `lookup`
///
/// # Errors
/// Returns `DeployError::Config` naming the variable when a value does not
/// parse.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    env.parse("DEPLOYWATCH_HTTP_TIMEOUT_MS", &mut config.http.timeout_ms)?;
    env.parse("DEPLOYWATCH_HTTP_RETRIES", &mut config.http.retries)?;
    env.string("DEPLOYWATCH_USER_AGENT", &mut config.http.user_agent);
    env.parse("DEPLOYWATCH_RATE_LIMIT_PER_MINUTE", &mut config.rate_limit.tokens_per_minute)?;
    env.parse("DEPLOYWATCH_WATCH_MAX_ATTEMPTS", &mut config.watch.max_attempts)?;
    env.parse("DEPLOYWATCH_WATCH_MAX_SECS", &mut config.watch.max_duration_secs)?;
    env.parse("DEPLOYWATCH_CACHE_MAX_SIZE", &mut config.cache.max_size)?;
    env.parse("DEPLOYWATCH_CACHE_TTL_SECS", &mut config.cache.ttl_secs)?;
    env.string("DEPLOYWATCH_VERCEL_API_URL", &mut config.platforms.vercel_api_url);
    env.string("DEPLOYWATCH_NETLIFY_API_URL", &mut config.platforms.netlify_api_url);
    env.string("DEPLOYWATCH_CLOUDFLARE_API_URL", &mut config.platforms.cloudflare_api_url);

    if let Some(account) = env.get("CLOUDFLARE_ACCOUNT_ID") {
        config.platforms.cloudflare_account_id = Some(account);
    }

    Ok(())
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Trimmed, non-empty value
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
    }

    fn string(&self, key: &str, target: &mut String) {
        if let Some(value) = self.get(key) {
            *target = value;
        }
    }

    fn parse<T>(&self, key: &str, target: &mut T) -> Result<()>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(raw) = self.get(key) {
            *target = raw
                .parse()
                .map_err(|e| DeployError::Config(format!("Invalid value for {key}: {e}")))?;
        }
        Ok(())
    }
}
