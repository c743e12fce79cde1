//! Platform API client
//!
//! Wraps [`HttpClient`] with the per-credential rate limiter and in-flight
//! deduplication. Every platform adapter owns one `ApiClient`.

use std::time::Duration;

use deploywatch_common::resilience::{Clock, KeyedRateLimiter, SystemClock};
use deploywatch_domain::RateLimitConfig;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::dedup::InFlightRegistry;
use super::endpoints::{HttpMethod, RequestTarget};
use super::errors::ApiError;
use crate::http::{HttpClient, RequestOptions};

/// Rate-limited, deduplicating client for one platform API
pub struct ApiClient<C: Clock = SystemClock> {
    http: HttpClient,
    limiter: KeyedRateLimiter<C>,
    in_flight: InFlightRegistry<Value>,
}

impl ApiClient<SystemClock> {
    pub fn new(http: HttpClient, rate_limit: &RateLimitConfig) -> Self {
        Self::with_clock(http, rate_limit, SystemClock)
    }
}

impl<C: Clock> ApiClient<C> {
    /// Client whose rate limiter reads time from `clock`
    pub fn with_clock(http: HttpClient, rate_limit: &RateLimitConfig, clock: C) -> Self {
        let limiter = KeyedRateLimiter::with_clock(
            rate_limit.tokens_per_minute,
            Duration::from_secs(rate_limit.idle_cleanup_secs),
            clock,
        );
        Self { http, limiter, in_flight: InFlightRegistry::new() }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn limiter(&self) -> &KeyedRateLimiter<C> {
        &self.limiter
    }

    /// Execute `target` and return the raw JSON body.
    ///
    /// Requests carrying a credential consume one token from that
    /// credential's bucket first. GET requests without a body are coalesced
    /// with identical calls already in flight.
    #[instrument(skip(self, options, cancel), fields(method = %target.method(), path = %target.path))]
    pub async fn request_value(
        &self,
        target: RequestTarget,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<Value, ApiError> {
        if let Some(credential) = options.credential() {
            self.limiter.check(credential).map_err(|limited| {
                ApiError::RateLimit { retry_after: limited.retry_after, endpoint: target.path.clone() }
                    .for_endpoint(&target.path, target.descriptor)
            })?;
        }

        if target.method() != HttpMethod::Get || options.has_body() {
            return self.http.execute(&target, &options, cancel).await;
        }

        let key = dedup_key(&target, &options);
        let http = self.http.clone();
        let cancel = cancel.clone();
        self.in_flight
            .run(&key, move || async move { http.execute(&target, &options, &cancel).await })
            .await
    }

    /// Execute `target` and decode the body into `T`
    pub async fn request<T: DeserializeOwned>(
        &self,
        target: RequestTarget,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        let path = target.path.clone();
        let descriptor = target.descriptor;
        let value = self.request_value(target, options, cancel).await?;

        serde_json::from_value(value).map_err(|err| {
            debug!(path = %path, error = %err, "response did not match expected shape");
            ApiError::Decode { path: path.clone(), snippet: err.to_string() }
                .for_endpoint(&path, descriptor)
        })
    }

    /// [`ApiClient::request`] without external cancellation
    pub async fn get<T: DeserializeOwned>(
        &self,
        target: RequestTarget,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(target, options, &CancellationToken::new()).await
    }

    /// Fetch a plain-text resource by absolute URL
    pub async fn fetch_text(&self, url: &str) -> Result<String, ApiError> {
        self.http.fetch_text(url, &CancellationToken::new()).await
    }

    /// Calls currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// `METHOD:path:query` where the query is serialized as a JSON object
fn dedup_key(target: &RequestTarget, options: &RequestOptions) -> String {
    let query = if options.query_pairs().is_empty() {
        String::new()
    } else {
        let params: Map<String, Value> = options
            .query_pairs()
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        Value::Object(params).to_string()
    };
    format!("{}:{}:{}", target.method(), target.path, query)
}

impl<C: Clock> std::fmt::Debug for ApiClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.http.base_url())
            .field("tracked_credentials", &self.limiter.tracked_keys())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use deploywatch_common::resilience::{MockClock, RetryConfig};
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::endpoints::EndpointDescriptor;
    use crate::api::errors::ApiErrorCategory;

    static DEPLOYMENTS: EndpointDescriptor = EndpointDescriptor::get(
        "/v6/deployments",
        "https://example.com/docs/deployments",
        "List deployments",
    );

    static REDEPLOY: EndpointDescriptor = EndpointDescriptor {
        path: "/v13/deployments",
        method: HttpMethod::Post,
        docs_url: "https://example.com/docs/create",
        description: "Create a deployment",
    };

    fn http(base_url: &str) -> HttpClient {
        HttpClient::builder()
            .base_url(base_url)
            .retry(RetryConfig::builder().max_attempts(1).build().unwrap())
            .build()
            .unwrap()
    }

    fn limits(tokens_per_minute: u32) -> RateLimitConfig {
        RateLimitConfig { tokens_per_minute, idle_cleanup_secs: 3_600 }
    }

    #[tokio::test]
    async fn concurrent_identical_gets_share_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/deployments"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"deployments": []}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = Arc::new(ApiClient::new(http(&server.uri()), &limits(30)));
        let calls = (0..4).map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .request_value(
                        DEPLOYMENTS.target(),
                        RequestOptions::new().query("limit", 5),
                        &CancellationToken::new(),
                    )
                    .await
            })
        });

        for result in futures::future::join_all(calls).await {
            assert_eq!(result.unwrap().unwrap(), json!({"deployments": []}));
        }
        assert_eq!(client.in_flight(), 0);
    }

    #[tokio::test]
    async fn writes_are_not_coalesced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true}))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = ApiClient::new(http(&server.uri()), &limits(30));
        let cancel = CancellationToken::new();
        let (a, b) = tokio::join!(
            client.request_value(REDEPLOY.target(), RequestOptions::new(), &cancel),
            client.request_value(REDEPLOY.target(), RequestOptions::new(), &cancel),
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn exhausted_bucket_rejects_without_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let clock = MockClock::new();
        let client = ApiClient::with_clock(http(&server.uri()), &limits(2), clock.clone());
        let options = RequestOptions::new().bearer("token-a");

        for _ in 0..2 {
            client
                .request_value(DEPLOYMENTS.target(), options.clone(), &CancellationToken::new())
                .await
                .unwrap();
        }

        let err = client
            .request_value(DEPLOYMENTS.target(), options, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.category(), ApiErrorCategory::RateLimit);
        match err.root_cause() {
            ApiError::RateLimit { retry_after, endpoint } => {
                assert_eq!(*retry_after, Duration::from_secs(30));
                assert_eq!(endpoint, "/v6/deployments");
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert!(!err.should_retry());

        // A different credential has its own bucket.
        assert!(client.limiter().check("token-b").is_ok());
    }

    #[tokio::test]
    async fn typed_request_reports_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Listing {
            #[allow(dead_code)]
            deployments: Vec<String>,
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deployments": 3})))
            .mount(&server)
            .await;

        let client = ApiClient::new(http(&server.uri()), &limits(30));
        let err = client.get::<Listing>(DEPLOYMENTS.target(), RequestOptions::new()).await.unwrap_err();

        assert_eq!(err.category(), ApiErrorCategory::Decode);
        assert_eq!(err.docs_url(), Some("https://example.com/docs/deployments"));
    }

    #[test]
    fn dedup_key_includes_query() {
        let plain = dedup_key(&DEPLOYMENTS.target(), &RequestOptions::new());
        let limited = dedup_key(&DEPLOYMENTS.target(), &RequestOptions::new().query("limit", 5));

        assert_eq!(plain, "GET:/v6/deployments:");
        assert_eq!(limited, r#"GET:/v6/deployments:{"limit":"5"}"#);
    }
}
