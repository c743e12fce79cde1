//! Helpers shared by the platform adapters

use chrono::{DateTime, Utc};
use deploywatch_domain::{DeployError, HttpConfig, RateLimitConfig, Result};

use crate::api::ApiClient;
use crate::http::HttpClientBuilder;

/// API client for one platform base URL
pub(crate) fn api_client(
    base_url: &str,
    http: &HttpConfig,
    rate_limit: &RateLimitConfig,
) -> Result<ApiClient> {
    let client = HttpClientBuilder::from_config(http)
        .base_url(base_url)
        .build()
        .map_err(|err| DeployError::Config(format!("Invalid API client for {base_url}: {err}")))?;
    Ok(ApiClient::new(client, rate_limit))
}

/// Epoch milliseconds to UTC
pub(crate) fn from_millis(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis.and_then(DateTime::from_timestamp_millis)
}

/// RFC 3339 text to UTC; unparseable values are dropped
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Prefix bare hostnames with `https://`
pub(crate) fn https_url(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// First non-empty value
pub(crate) fn first_present<'a>(values: &[Option<&'a str>]) -> Option<&'a str> {
    values.iter().flatten().copied().find(|value| !value.is_empty())
}

/// Client against a mock server with one fast retry
#[cfg(test)]
pub(crate) fn test_http(base_url: &str) -> crate::http::HttpClient {
    use std::time::Duration;

    use deploywatch_common::resilience::RetryConfig;

    HttpClientBuilder::default()
        .base_url(base_url)
        .retry(
            RetryConfig::builder()
                .max_attempts(2)
                .fixed_backoff(Duration::from_millis(5))
                .no_jitter()
                .build()
                .expect("retry config"),
        )
        .build()
        .expect("http client")
}
