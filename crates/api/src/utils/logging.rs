use std::time::Duration;

use deploywatch_domain::DeployError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting the log output format
pub const LOG_FORMAT_VAR: &str = "DEPLOYWATCH_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable lines
    #[default]
    Text,
}

impl LogFormat {
    /// `json` (any case) selects JSON, anything else plain text
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_VAR).ok().as_deref())
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr; stdout carries protocol responses. `RUST_LOG` picks
/// the filter, defaulting to `info`. Calling this twice is a no-op.
pub fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init(),
        LogFormat::Text => {
            registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)).try_init()
        }
    };
    // Already initialised (tests, embedding hosts)
    let _ = result;
}

/// Log the outcome of a tool call with structured fields.
///
/// `tool` is the tool name; `platform` the requested platform, which may be
/// unknown when argument parsing failed. Credentials must never be passed
/// here.
#[inline]
pub fn log_command_execution(tool: &str, platform: Option<&str>, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;
    let platform = platform.unwrap_or("-");

    if success {
        info!(tool, platform, duration_ms, "tool_call_success");
    } else {
        warn!(tool, platform, duration_ms, "tool_call_failure");
    }
}

/// Convert a `DeployError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &DeployError) -> &'static str {
    match error {
        DeployError::Config(_) => "config",
        DeployError::Platform(_) => "platform",
        DeployError::Network(_) => "network",
        DeployError::Auth(_) => "auth",
        DeployError::RateLimited(_) => "rate_limited",
        DeployError::NotFound(_) => "not_found",
        DeployError::InvalidInput(_) => "invalid_input",
        DeployError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Text);
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
    }

    #[test]
    fn test_error_labels_are_stable() {
        assert_eq!(error_label(&DeployError::Auth("x".into())), "auth");
        assert_eq!(error_label(&DeployError::RateLimited("x".into())), "rate_limited");
        assert_eq!(error_label(&DeployError::InvalidInput("x".into())), "invalid_input");
    }
}
