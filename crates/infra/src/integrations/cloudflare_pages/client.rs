/// Cloudflare Pages adapter
use async_trait::async_trait;
use deploywatch_core::PlatformAdapter;
use deploywatch_domain::constants::PLATFORM_CLOUDFLARE_PAGES;
use deploywatch_domain::{
    Config, DeployError, DeploymentRecord, ProjectSummary, RateLimitConfig, Result,
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::types::{Envelope, PagesDeployment, PagesLogEntry, PagesLogs, PagesProject};
use crate::api::{ApiClient, EndpointDescriptor};
use crate::http::{HttpClient, RequestOptions};
use crate::integrations::support;

const API_DOCS: &str = "https://developers.cloudflare.com/api/resources/pages/";
const DEPLOYMENT_DOCS: &str = "https://developers.cloudflare.com/pages/configuration/deployments/";

static LIST_PROJECTS: EndpointDescriptor = EndpointDescriptor::get(
    "/accounts/{account_id}/pages/projects",
    API_DOCS,
    "List all Cloudflare Pages projects",
);

static LIST_DEPLOYMENTS: EndpointDescriptor = EndpointDescriptor::get(
    "/accounts/{account_id}/pages/projects/{project_name}/deployments",
    DEPLOYMENT_DOCS,
    "List deployments for a project",
);

static GET_DEPLOYMENT: EndpointDescriptor = EndpointDescriptor::get(
    "/accounts/{account_id}/pages/projects/{project_name}/deployments/{deployment_id}",
    DEPLOYMENT_DOCS,
    "Get details for a specific deployment",
);

static GET_DEPLOYMENT_LOGS: EndpointDescriptor = EndpointDescriptor::get(
    "/accounts/{account_id}/pages/projects/{project_name}/deployments/{deployment_id}/history/logs",
    DEPLOYMENT_DOCS,
    "Get logs for a deployment",
);

pub const NO_LOGS: &str = "No logs available";

/// Account id and API token taken from a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesCredential<'a> {
    pub account_id: &'a str,
    pub token: &'a str,
}

/// Split `accountId:apiToken`; a bare token uses `default_account`
pub fn parse_credential<'a>(
    credential: &'a str,
    default_account: Option<&'a str>,
) -> Result<PagesCredential<'a>> {
    let (account_id, token) = match credential.split_once(':') {
        Some((account_id, token)) => (account_id, token),
        None => (default_account.unwrap_or_default(), credential),
    };

    if account_id.trim().is_empty() {
        return Err(DeployError::Auth(
            "Cloudflare account ID is required. Provide it as 'accountId:apiToken' or set \
             CLOUDFLARE_ACCOUNT_ID environment variable"
                .to_string(),
        ));
    }
    Ok(PagesCredential { account_id: account_id.trim(), token: token.trim() })
}

/// Split a `projectName:deploymentId` id
pub fn parse_deployment_id(deployment_id: &str) -> Result<(&str, &str)> {
    match deployment_id.split_once(':') {
        Some((project, id)) if !project.is_empty() && !id.is_empty() => Ok((project, id)),
        _ => Err(DeployError::InvalidInput(
            "Deployment ID must be in format 'projectName:deploymentId' for Cloudflare Pages"
                .to_string(),
        )),
    }
}

/// Cloudflare Pages deployments through the v4 API
#[derive(Debug)]
pub struct CloudflarePagesAdapter {
    api: ApiClient,
    default_account: Option<String>,
}

impl CloudflarePagesAdapter {
    pub fn new(
        http: HttpClient,
        rate_limit: &RateLimitConfig,
        default_account: Option<String>,
    ) -> Self {
        Self { api: ApiClient::new(http, rate_limit), default_account }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api = support::api_client(
            &config.platforms.cloudflare_api_url,
            &config.http,
            &config.rate_limit,
        )?;
        let default_account =
            config.platforms.cloudflare_account_id.clone().filter(|id| !id.trim().is_empty());
        Ok(Self { api, default_account })
    }

    fn credential<'a>(&'a self, credential: &'a str) -> Result<PagesCredential<'a>> {
        parse_credential(credential, self.default_account.as_deref())
    }

    /// GET an enveloped resource and unwrap its `result`
    async fn call<T: DeserializeOwned>(
        &self,
        descriptor: &'static EndpointDescriptor,
        credential: &PagesCredential<'_>,
        params: &[(&str, &str)],
        options: RequestOptions,
    ) -> Result<T> {
        let mut bound = vec![("account_id", credential.account_id)];
        bound.extend_from_slice(params);
        let target = descriptor.bind(&bound);
        let path = target.path.clone();

        let envelope: Envelope<T> = self.api.get(target, options.bearer(credential.token)).await?;
        Ok(envelope.into_result().map_err(|err| err.for_endpoint(&path, descriptor))?)
    }
}

#[async_trait]
impl PlatformAdapter for CloudflarePagesAdapter {
    fn name(&self) -> &'static str {
        PLATFORM_CLOUDFLARE_PAGES
    }

    async fn authenticate(&self, credential: &str) -> Result<bool> {
        let Ok(parsed) = self.credential(credential) else {
            return Ok(false);
        };
        let options = RequestOptions::new().query("per_page", 1);
        match self.call::<Vec<PagesProject>>(&LIST_PROJECTS, &parsed, &[], options).await {
            Ok(_) => Ok(true),
            Err(err) => {
                debug!(error = %err, "Cloudflare token rejected");
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
        let parsed = self.credential(credential)?;
        let options = RequestOptions::new().query("per_page", limit);
        let deployments: Vec<PagesDeployment> = self
            .call(&LIST_DEPLOYMENTS, &parsed, &[("project_name", project)], options)
            .await?;

        Ok(deployments
            .into_iter()
            .take(limit)
            .map(|deployment| deployment.into_record(project))
            .collect())
    }

    async fn deployment(&self, deployment_id: &str, credential: &str) -> Result<DeploymentRecord> {
        let (project, id) = parse_deployment_id(deployment_id)?;
        let parsed = self.credential(credential)?;
        let deployment: PagesDeployment = self
            .call(
                &GET_DEPLOYMENT,
                &parsed,
                &[("project_name", project), ("deployment_id", id)],
                RequestOptions::new(),
            )
            .await?;

        Ok(deployment.into_record(project))
    }

    #[instrument(skip(self, credential))]
    async fn deployment_logs(&self, deployment_id: &str, credential: &str) -> Result<String> {
        let (project, id) = parse_deployment_id(deployment_id)?;
        let parsed = self.credential(credential)?;
        let logs: PagesLogs = self
            .call(
                &GET_DEPLOYMENT_LOGS,
                &parsed,
                &[("project_name", project), ("deployment_id", id)],
                RequestOptions::new(),
            )
            .await?;

        if logs.data.is_empty() {
            return Ok(NO_LOGS.to_string());
        }
        Ok(logs.data.iter().map(PagesLogEntry::format_line).collect::<Vec<_>>().join("\n"))
    }

    async fn list_projects(&self, credential: &str, limit: usize) -> Result<Vec<ProjectSummary>> {
        let parsed = self.credential(credential)?;
        let options = RequestOptions::new().query("per_page", limit);
        let projects: Vec<PagesProject> =
            self.call(&LIST_PROJECTS, &parsed, &[], options).await?;

        Ok(projects.into_iter().take(limit).map(ProjectSummary::from).collect())
    }
}
