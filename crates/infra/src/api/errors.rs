//! API-specific error types
//!
//! Provides error classification for platform API calls with retry metadata.

use std::time::Duration;

use thiserror::Error;

use super::endpoints::EndpointDescriptor;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Connection-level failures - retryable
    Transport,
    /// Per-attempt timeout - retryable
    Timeout,
    /// Non-2xx responses - retryable only for 5xx
    Http,
    /// Unparseable bodies - non-retryable
    Decode,
    /// Local rate limiter refused the call - non-retryable
    RateLimit,
    /// Caller cancelled - non-retryable
    Cancelled,
    /// Platform reported failure inside a successful response
    Platform,
}

/// Platform API errors
///
/// `Clone` so a single failure can be handed to every caller that shared
/// an in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{method} {url} failed with {status}: {status_text}")]
    Http { status: u16, status_text: String, url: String, method: String },

    #[error("Invalid JSON response from {path}: {snippet}")]
    Decode { path: String, snippet: String },

    #[error("Rate limit exceeded for {endpoint}. Retry after {}ms", .retry_after.as_millis())]
    RateLimit { retry_after: Duration, endpoint: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("{0}")]
    Platform(String),

    /// Any of the above, annotated with the endpoint that produced it
    #[error("API request failed for {path}: {source}\nSee docs: {docs_url}")]
    Endpoint {
        path: String,
        description: &'static str,
        docs_url: &'static str,
        source: Box<ApiError>,
    },
}

impl ApiError {
    /// Attach endpoint context; already annotated errors are left alone
    pub fn for_endpoint(self, path: &str, descriptor: &EndpointDescriptor) -> Self {
        match self {
            Self::Endpoint { .. } => self,
            other => Self::Endpoint {
                path: path.to_string(),
                description: descriptor.description,
                docs_url: descriptor.docs_url,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping endpoint annotations
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Endpoint { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self.root_cause() {
            Self::Transport(_) => ApiErrorCategory::Transport,
            Self::Timeout(_) => ApiErrorCategory::Timeout,
            Self::Http { .. } => ApiErrorCategory::Http,
            Self::Decode { .. } => ApiErrorCategory::Decode,
            Self::RateLimit { .. } => ApiErrorCategory::RateLimit,
            Self::Cancelled => ApiErrorCategory::Cancelled,
            Self::Platform(_) | Self::Endpoint { .. } => ApiErrorCategory::Platform,
        }
    }

    /// HTTP status of the innermost error, if it was an HTTP error
    pub fn status(&self) -> Option<u16> {
        match self.root_cause() {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error should be retried
    pub fn should_retry(&self) -> bool {
        match self.category() {
            ApiErrorCategory::Transport | ApiErrorCategory::Timeout => true,
            ApiErrorCategory::Http => self.status().is_some_and(|status| status >= 500),
            ApiErrorCategory::Decode
            | ApiErrorCategory::RateLimit
            | ApiErrorCategory::Cancelled
            | ApiErrorCategory::Platform => false,
        }
    }

    /// Documentation link of the endpoint annotation, if any
    pub fn docs_url(&self) -> Option<&'static str> {
        match self {
            Self::Endpoint { docs_url, .. } => Some(docs_url),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::endpoints::HttpMethod;

    const USER: EndpointDescriptor = EndpointDescriptor {
        path: "/v2/user",
        method: HttpMethod::Get,
        docs_url: "https://example.com/docs/user",
        description: "Get authenticated user information",
    };

    fn http(status: u16) -> ApiError {
        ApiError::Http {
            status,
            status_text: "Status".to_string(),
            url: "https://api.example.com/v2/user".to_string(),
            method: "GET".to_string(),
        }
    }

    #[test]
    fn test_should_retry() {
        assert!(ApiError::Transport("reset".to_string()).should_retry());
        assert!(ApiError::Timeout(Duration::from_secs(10)).should_retry());
        assert!(http(500).should_retry());
        assert!(http(503).should_retry());
        assert!(!http(404).should_retry());
        assert!(!http(401).should_retry());
        assert!(!ApiError::Cancelled.should_retry());
        assert!(!ApiError::Decode { path: "/x".into(), snippet: "<".into() }.should_retry());
    }

    #[test]
    fn test_endpoint_wrapper_keeps_cause() {
        let wrapped = http(401).for_endpoint("/v2/user", &USER);

        assert_eq!(wrapped.status(), Some(401));
        assert_eq!(wrapped.category(), ApiErrorCategory::Http);
        assert_eq!(wrapped.docs_url(), Some("https://example.com/docs/user"));
        assert_eq!(
            wrapped.to_string(),
            "API request failed for /v2/user: GET https://api.example.com/v2/user failed with \
             401: Status\nSee docs: https://example.com/docs/user"
        );

        let twice = wrapped.clone().for_endpoint("/other", &USER);
        assert_eq!(twice, wrapped);
    }

    #[test]
    fn test_rate_limit_message() {
        let err = ApiError::RateLimit {
            retry_after: Duration::from_millis(2_000),
            endpoint: "/v6/deployments".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded for /v6/deployments. Retry after 2000ms");
        assert_eq!(err.category(), ApiErrorCategory::RateLimit);
    }
}
