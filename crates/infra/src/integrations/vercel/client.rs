/// Vercel adapter
use async_trait::async_trait;
use deploywatch_core::PlatformAdapter;
use deploywatch_domain::constants::PLATFORM_VERCEL;
use deploywatch_domain::{Config, DeploymentRecord, ProjectSummary, RateLimitConfig, Result};
use tracing::{debug, instrument};

use super::types::{
    VercelDeployment, VercelDeploymentsResponse, VercelEvent, VercelProjectsResponse,
    VercelUserResponse,
};
use crate::api::{ApiClient, EndpointDescriptor};
use crate::http::{HttpClient, RequestOptions};
use crate::integrations::support;

static LIST_DEPLOYMENTS: EndpointDescriptor = EndpointDescriptor::get(
    "/v6/deployments",
    "https://vercel.com/docs/rest-api/endpoints/deployments#list-deployments",
    "List deployments for authenticated user or team",
);

static GET_DEPLOYMENT: EndpointDescriptor = EndpointDescriptor::get(
    "/v13/deployments/{id}",
    "https://vercel.com/docs/rest-api/endpoints/deployments#get-a-deployment-by-id-or-url",
    "Get deployment by ID or URL",
);

static GET_DEPLOYMENT_EVENTS: EndpointDescriptor = EndpointDescriptor::get(
    "/v2/deployments/{id}/events",
    "https://vercel.com/docs/rest-api/endpoints/deployments#get-deployment-events",
    "Get build logs and events for a deployment",
);

static GET_USER: EndpointDescriptor = EndpointDescriptor::get(
    "/v2/user",
    "https://vercel.com/docs/rest-api/endpoints/user#get-the-authenticated-user",
    "Get authenticated user information",
);

static LIST_PROJECTS: EndpointDescriptor = EndpointDescriptor::get(
    "/v9/projects",
    "https://vercel.com/docs/rest-api/endpoints/projects#retrieve-a-list-of-projects",
    "List projects for authenticated user or team",
);

/// Vercel deployments through the REST API
#[derive(Debug)]
pub struct VercelAdapter {
    api: ApiClient,
}

impl VercelAdapter {
    pub fn new(http: HttpClient, rate_limit: &RateLimitConfig) -> Self {
        Self { api: ApiClient::new(http, rate_limit) }
    }

    /// Adapter for the configured Vercel API URL
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = support::api_client(
            &config.platforms.vercel_api_url,
            &config.http,
            &config.rate_limit,
        )?;
        Ok(Self { api })
    }
}

#[async_trait]
impl PlatformAdapter for VercelAdapter {
    fn name(&self) -> &'static str {
        PLATFORM_VERCEL
    }

    async fn authenticate(&self, credential: &str) -> Result<bool> {
        let options = RequestOptions::new().bearer(credential);
        match self.api.get::<VercelUserResponse>(GET_USER.target(), options).await {
            Ok(response) => Ok(response.user.id.is_some()),
            Err(err) => {
                debug!(error = %err, "Vercel token rejected");
                Ok(false)
            }
        }
    }

    #[instrument(skip(self, credential))]
    async fn recent_deployments(
        &self,
        project: &str,
        credential: &str,
        limit: usize,
    ) -> Result<Vec<DeploymentRecord>> {
        let options = RequestOptions::new()
            .bearer(credential)
            .query("projectId", project)
            .query("limit", limit);

        let response: VercelDeploymentsResponse =
            self.api.get(LIST_DEPLOYMENTS.target(), options).await?;

        Ok(response.deployments.into_iter().map(VercelDeployment::into_record).collect())
    }

    async fn deployment(&self, deployment_id: &str, credential: &str) -> Result<DeploymentRecord> {
        let target = GET_DEPLOYMENT.bind(&[("id", deployment_id)]);
        let deployment: VercelDeployment =
            self.api.get(target, RequestOptions::new().bearer(credential)).await?;

        Ok(deployment.into_record())
    }

    #[instrument(skip(self, credential))]
    async fn deployment_logs(&self, deployment_id: &str, credential: &str) -> Result<String> {
        let target = GET_DEPLOYMENT_EVENTS.bind(&[("id", deployment_id)]);
        let options = RequestOptions::new().bearer(credential).query("builds", 1);
        let events: Vec<VercelEvent> = self.api.get(target, options).await?;

        let lines: Vec<&str> = events.iter().filter_map(VercelEvent::output_line).collect();
        debug!(events = events.len(), lines = lines.len(), "Fetched Vercel build events");
        Ok(lines.join("\n"))
    }

    async fn list_projects(&self, credential: &str, limit: usize) -> Result<Vec<ProjectSummary>> {
        let options = RequestOptions::new().bearer(credential).query("limit", limit);
        let response: VercelProjectsResponse =
            self.api.get(LIST_PROJECTS.target(), options).await?;

        Ok(response.projects.into_iter().take(limit).map(ProjectSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use deploywatch_domain::{DeployError, DeploymentOutcome, DeploymentState};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::integrations::support::test_http;

    fn adapter(server: &MockServer) -> VercelAdapter {
        VercelAdapter::new(test_http(&server.uri()), &RateLimitConfig::default())
    }

    #[tokio::test]
    async fn test_latest_deployment_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/deployments"))
            .and(query_param("projectId", "web"))
            .and(query_param("limit", "1"))
            .and(header("authorization", "Bearer vc-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "deployments": [{
                    "uid": "dpl_1",
                    "name": "web",
                    "url": "web-1.vercel.app",
                    "state": "BUILDING",
                    "createdAt": 1_700_000_000_000_i64
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let status = adapter(&server).latest_deployment("web", "vc-token").await.unwrap();

        assert_eq!(status.platform.as_deref(), Some("vercel"));
        assert_eq!(status.status, DeploymentOutcome::Building);
        assert_eq!(status.url.as_deref(), Some("https://web-1.vercel.app"));
    }

    #[tokio::test]
    async fn test_no_deployments_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deployments": []})))
            .mount(&server)
            .await;

        let status = adapter(&server).latest_deployment("web", "vc-token").await.unwrap();
        assert_eq!(status.status, DeploymentOutcome::Unknown);
    }

    #[tokio::test]
    async fn test_deployment_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v13/deployments/dpl_9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "dpl_9",
                "readyState": "ERROR",
                "target": "preview"
            })))
            .mount(&server)
            .await;

        let record = adapter(&server).deployment("dpl_9", "vc-token").await.unwrap();
        assert_eq!(record.id, "dpl_9");
        assert_eq!(record.state, DeploymentState::Error);
        assert_eq!(record.environment.as_deref(), Some("preview"));
    }

    #[tokio::test]
    async fn test_logs_keep_only_output_events() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/deployments/dpl_9/events"))
            .and(query_param("builds", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "command", "payload": {"text": "npm run build"}},
                {"type": "stdout", "payload": {"text": "Building..."}},
                {"type": "stderr", "payload": {"text": "Error: Cannot find module 'x'"}}
            ])))
            .mount(&server)
            .await;

        let logs = adapter(&server).deployment_logs("dpl_9", "vc-token").await.unwrap();
        assert_eq!(logs, "Building...\nError: Cannot find module 'x'");
    }

    #[tokio::test]
    async fn test_list_projects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v9/projects"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [
                    {"id": "prj_1", "name": "web", "updatedAt": 1_700_000_000_000_i64,
                     "latestDeployments": [{"url": "web-1.vercel.app"}]},
                    {"id": "prj_2", "name": "docs"}
                ]
            })))
            .mount(&server)
            .await;

        let projects = adapter(&server).list_projects("vc-token", 2).await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].url.as_deref(), Some("https://web-1.vercel.app"));
        assert_eq!(projects[1].url, None);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/user"))
            .and(header("authorization", "Bearer good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "u1"}})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/user"))
            .and(header("authorization", "Bearer bad"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let adapter = adapter(&server);
        assert!(adapter.authenticate("good").await.unwrap());
        assert!(!adapter.authenticate("bad").await.unwrap());
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = adapter(&server).recent_deployments("web", "expired", 5).await.unwrap_err();
        assert!(matches!(err, DeployError::Auth(_)), "got {err:?}");
        assert!(err.to_string().contains("list-deployments"));
    }
}
