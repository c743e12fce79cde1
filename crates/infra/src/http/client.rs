use std::time::Duration;

use deploywatch_common::resilience::{RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryPolicy};
use deploywatch_domain::constants::DECODE_SNIPPET_LEN;
use deploywatch_domain::HttpConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client as ReqwestClient;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use crate::api::endpoints::{HttpMethod, RequestTarget};
use crate::api::errors::ApiError;

/// Per-call request options.
///
/// Call headers override the client's default headers on collision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    credential: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate with a bearer token; the token also keys rate limiting
    pub fn bearer(mut self, credential: &str) -> Self {
        self.headers.push(("Authorization".to_string(), format!("Bearer {credential}")));
        self.credential = Some(credential.to_string());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter only when it has a value
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }
}

/// Retries transport failures, timeouts and 5xx responses
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiRetryPolicy;

impl RetryPolicy<ApiError> for ApiRetryPolicy {
    fn should_retry(&self, error: &ApiError, _attempt: u32) -> RetryDecision {
        if error.should_retry() {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// HTTP client with built-in retry and timeout support.
///
/// Every call resolves a [`RequestTarget`] against the base URL, sends it
/// with a per-attempt timeout, retries retryable failures with capped
/// exponential backoff and decodes the body as JSON. Errors come back
/// annotated with the endpoint's path and documentation link.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
    default_headers: HeaderMap,
    timeout: Duration,
    retry: RetryExecutor<ApiRetryPolicy>,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute `target` and decode the body as JSON.
    ///
    /// An empty body decodes to an empty JSON object.
    #[instrument(skip(self, options, cancel), fields(method = %target.method(), path = %target.path))]
    pub async fn execute(
        &self,
        target: &RequestTarget,
        options: &RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<Value, ApiError> {
        let annotate = |err: ApiError| err.for_endpoint(&target.path, target.descriptor);

        let url = self.build_url(&target.path, &options.query).map_err(annotate)?;
        let headers = self.merge_headers(&options.headers).map_err(annotate)?;
        let method = target.method();
        let body = options.body.as_ref();

        self.retry
            .execute(cancel, |attempt| {
                self.attempt_json(method, &target.path, &url, &headers, body, attempt)
            })
            .await
            .map_err(|err| annotate(from_retry_error(err)))
    }

    /// Fetch a plain-text resource by absolute URL with the same retry and
    /// timeout rules.
    #[instrument(skip(self, cancel))]
    pub async fn fetch_text(&self, url: &str, cancel: &CancellationToken) -> Result<String, ApiError> {
        let url = Url::parse(url).map_err(|err| ApiError::Transport(format!("Invalid URL {url}: {err}")))?;

        self.retry
            .execute(cancel, |attempt| self.attempt_text(&url, attempt))
            .await
            .map_err(from_retry_error)
    }

    fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let joined = format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'));
        let mut url = Url::parse(&joined)
            .map_err(|err| ApiError::Transport(format!("Invalid URL {joined}: {err}")))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    fn merge_headers(&self, call_headers: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut headers = self.default_headers.clone();
        for (name, value) in call_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| ApiError::Transport(format!("Invalid header name {name}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| ApiError::Transport(format!("Invalid header value for {name}: {err}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    async fn attempt_json(
        &self,
        method: HttpMethod,
        path: &str,
        url: &Url,
        headers: &HeaderMap,
        body: Option<&Value>,
        attempt: u32,
    ) -> Result<Value, ApiError> {
        debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

        let mut request = self.client.request(method.into(), url.clone()).headers(headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

            if !status.is_success() {
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                    url: url.to_string(),
                    method: method.to_string(),
                });
            }

            let text = response.text().await?;
            parse_body(path, &text)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .unwrap_or(Err(ApiError::Timeout(self.timeout)))
    }

    async fn attempt_text(&self, url: &Url, attempt: u32) -> Result<String, ApiError> {
        debug!(attempt = attempt + 1, %url, "fetching text resource");

        let exchange = async {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                    url: url.to_string(),
                    method: HttpMethod::Get.to_string(),
                });
            }
            Ok(response.text().await?)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .unwrap_or(Err(ApiError::Timeout(self.timeout)))
    }
}

fn from_retry_error(err: RetryError<ApiError>) -> ApiError {
    match err {
        RetryError::AttemptsExhausted { last_error, .. } => last_error,
        RetryError::NonRetryable { error, .. } => error,
        RetryError::Cancelled { .. } => ApiError::Cancelled,
        RetryError::InvalidConfiguration { message } => ApiError::Platform(message),
    }
}

/// Empty bodies decode to `{}`; anything else must be JSON
fn parse_body(path: &str, text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(text).map_err(|_| ApiError::Decode {
        path: path.to_string(),
        snippet: text.chars().take(DECODE_SNIPPET_LEN).collect(),
    })
}

/// Builder for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    base_url: String,
    timeout: Duration,
    retry: RetryConfig,
    user_agent: String,
    default_headers: Vec<(String, String)>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

impl HttpClientBuilder {
    /// Timeout, retry schedule and user agent from configuration
    pub fn from_config(config: &HttpConfig) -> Self {
        let retry = RetryConfig::builder()
            .max_attempts(config.retries.saturating_add(1))
            .exponential_backoff(
                Duration::from_millis(config.base_backoff_ms),
                2.0,
                Duration::from_millis(config.max_backoff_ms),
            )
            .bounded_jitter(Duration::from_millis(config.jitter_ms));

        Self {
            base_url: String::new(),
            timeout: config.timeout(),
            retry: retry.build().unwrap_or_default(),
            user_agent: config.user_agent.clone(),
            default_headers: Vec::new(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<HttpClient, ApiError> {
        self.retry.validate().map_err(|err| ApiError::Platform(err.to_string()))?;
        Url::parse(&self.base_url)
            .map_err(|err| ApiError::Transport(format!("Invalid base URL {}: {err}", self.base_url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|err| ApiError::Transport(format!("Invalid user agent: {err}")))?;
        headers.insert(USER_AGENT, agent);

        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| ApiError::Transport(format!("Invalid header name {name}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| ApiError::Transport(format!("Invalid header value: {err}")))?;
            headers.insert(name, value);
        }

        let client = ReqwestClient::builder().no_proxy().build()?;

        Ok(HttpClient {
            client,
            base_url: self.base_url,
            default_headers: headers,
            timeout: self.timeout,
            retry: RetryExecutor::new(self.retry, ApiRetryPolicy),
        })
    }
}
