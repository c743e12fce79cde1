//! Application constants
//!
//! Centralized location for domain-level defaults and fixed message texts.

// Platform identifiers
pub const PLATFORM_VERCEL: &str = "vercel";
pub const PLATFORM_NETLIFY: &str = "netlify";
pub const PLATFORM_CLOUDFLARE_PAGES: &str = "cloudflare-pages";
pub const SUPPORTED_PLATFORMS: [&str; 3] =
    [PLATFORM_VERCEL, PLATFORM_NETLIFY, PLATFORM_CLOUDFLARE_PAGES];

// Request executor defaults
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
pub const DEFAULT_JITTER_MS: u64 = 1_000;
pub const DEFAULT_USER_AGENT: &str = "deploy-mcp/1.0.0";

// Rate limiting
pub const MAX_TOKENS_PER_MINUTE: u32 = 30;
pub const RATE_LIMIT_IDLE_CLEANUP_SECS: u64 = 3_600;

// Deployment watch
pub const MAX_DEPLOYMENT_WATCH_ATTEMPTS: u32 = 120;
pub const MAX_WATCH_TIME_SECS: u64 = 240;
pub const INITIALIZING_POLL_MS: u64 = 5_000;
pub const BUILDING_POLL_MS: u64 = 3_000;
pub const UPLOADING_POLL_MS: u64 = 2_000;
pub const DEPLOYING_POLL_MS: u64 = 2_000;
pub const UNKNOWN_POLL_MS: u64 = 10_000;
pub const DEPLOYMENT_ID_DISPLAY_LEN: usize = 7;

// Adapter-instance cache
pub const MAX_ADAPTER_CACHE_SIZE: usize = 10;
pub const ADAPTER_CACHE_TTL_SECS: u64 = 30 * 60;
pub const ADAPTER_CACHE_CLEANUP_SECS: u64 = 5 * 60;

// Comparison and listing
pub const DEFAULT_COMPARISON_COUNT: usize = 2;
pub const DEFAULT_STATUS_LIMIT: usize = 1;
pub const DEFAULT_PROJECT_LIMIT: usize = 20;
pub const HIGH_RISK_PERCENT: i64 = 50;
pub const MEDIUM_RISK_PERCENT: i64 = 20;

// Payload snippets
pub const DECODE_SNIPPET_LEN: usize = 100;

// Watch message texts
pub const MSG_NO_TOKEN: &str = "No token provided";
pub const MSG_NO_DEPLOYMENT: &str = "No deployment found for this project";
pub const MSG_WATCH_CANCELLED: &str = "Deployment watch cancelled";
pub const MSG_CHECK_DASHBOARD: &str = "Check the platform dashboard for the latest status";
pub const MSG_LOGS_UNAVAILABLE: &str = "Deployment failed - unable to fetch logs";
pub const MSG_LOGS_UNAVAILABLE_HINT: &str = "Check deployment platform dashboard";
pub const MSG_NO_MATCHING_LOGS: &str = "No logs matching filter criteria";
