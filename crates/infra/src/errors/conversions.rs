//! Conversions from external infrastructure errors into domain errors.

use deploywatch_domain::DeployError;

use crate::api::errors::ApiError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DeployError);

impl From<InfraError> for DeployError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DeployError> for InfraError {
    fn from(value: DeployError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDeployError {
    fn into_deploy(self) -> DeployError;
}

/* -------------------------------------------------------------------------- */
/* ApiError → DeployError */
/* -------------------------------------------------------------------------- */

impl IntoDeployError for ApiError {
    fn into_deploy(self) -> DeployError {
        // Classify by the innermost cause but keep the annotated message,
        // docs link included.
        let message = self.to_string();

        match self.root_cause() {
            ApiError::Platform(_) => DeployError::Platform(message),
            ApiError::RateLimit { .. } => DeployError::RateLimited(message),
            ApiError::Http { status: 401 | 403, .. } => DeployError::Auth(message),
            ApiError::Http { status: 404, .. } => DeployError::NotFound(message),
            ApiError::Decode { .. } => DeployError::Platform(message),
            ApiError::Cancelled => DeployError::Internal(message),
            ApiError::Transport(_)
            | ApiError::Timeout(_)
            | ApiError::Http { .. }
            | ApiError::Endpoint { .. } => DeployError::Network(message),
        }
    }
}

impl From<ApiError> for InfraError {
    fn from(value: ApiError) -> Self {
        InfraError(value.into_deploy())
    }
}

impl From<ApiError> for DeployError {
    fn from(value: ApiError) -> Self {
        value.into_deploy()
    }
}

/* -------------------------------------------------------------------------- */
/* Config parsing errors → DeployError */
/* -------------------------------------------------------------------------- */

impl IntoDeployError for toml::de::Error {
    fn into_deploy(self) -> DeployError {
        DeployError::Config(format!("invalid TOML: {}", self.message()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_deploy())
    }
}

impl IntoDeployError for serde_json::Error {
    fn into_deploy(self) -> DeployError {
        DeployError::Config(format!("invalid JSON at line {}: {self}", self.line()))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_deploy())
    }
}

impl IntoDeployError for std::io::Error {
    fn into_deploy(self) -> DeployError {
        DeployError::Config(format!("unable to read configuration: {self}"))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_deploy())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::endpoints::EndpointDescriptor;
    use crate::http::{HttpClient, RequestOptions};

    static USER: EndpointDescriptor = EndpointDescriptor::get(
        "/v2/user",
        "https://vercel.com/docs/rest-api/endpoints/user",
        "Get authenticated user information",
    );

    fn http(status: u16) -> ApiError {
        ApiError::Http {
            status,
            status_text: "Status".into(),
            url: "https://api.example.com/x".into(),
            method: "GET".into(),
        }
    }

    #[test]
    fn http_statuses_map_by_innermost_cause() {
        let auth: DeployError = http(403).for_endpoint("/v2/user", &USER).into();
        let missing: DeployError = http(404).into();
        let server: DeployError = http(502).into();

        assert!(matches!(auth, DeployError::Auth(_)));
        assert!(auth.message().contains("See docs: https://vercel.com/docs"));
        assert!(matches!(missing, DeployError::NotFound(_)));
        assert!(matches!(server, DeployError::Network(_)));
    }

    #[test]
    fn rate_limit_and_platform_errors_keep_their_kind() {
        let limited: DeployError = ApiError::RateLimit {
            retry_after: Duration::from_millis(1500),
            endpoint: "/v6/deployments".into(),
        }
        .into();
        let platform: DeployError = ApiError::Platform("Project not found".into()).into();
        let timeout: DeployError = ApiError::Timeout(Duration::from_secs(10)).into();

        match limited {
            DeployError::RateLimited(msg) => assert!(msg.contains("Retry after 1500ms")),
            other => panic!("expected rate limited, got {:?}", other),
        }
        assert_eq!(platform, DeployError::Platform("Project not found".into()));
        assert!(matches!(timeout, DeployError::Network(_)));
    }

    #[test]
    fn toml_errors_map_to_config() {
        let err = toml::from_str::<toml::Table>("not = [valid").unwrap_err();
        let mapped: DeployError = InfraError::from(err).into();

        match mapped {
            DeployError::Config(msg) => assert!(msg.starts_with("invalid TOML")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = HttpClient::builder().base_url(server.uri()).build().unwrap();
        let error = client
            .execute(&USER.target(), &RequestOptions::new(), &Default::default())
            .await
            .unwrap_err();

        let mapped: DeployError = InfraError::from(error).into();
        match mapped {
            DeployError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }
}
