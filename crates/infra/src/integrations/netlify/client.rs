/// Netlify adapter
use std::collections::HashMap;

use async_trait::async_trait;
use deploywatch_core::PlatformAdapter;
use deploywatch_domain::constants::PLATFORM_NETLIFY;
use deploywatch_domain::{
    Config, DeployError, DeploymentRecord, ProjectSummary, RateLimitConfig, Result,
};
use parking_lot::Mutex;
use tracing::{debug, instrument};

use super::types::{NetlifyDeploy, NetlifySite, NetlifyUser};
use crate::api::{ApiClient, EndpointDescriptor};
use crate::http::{HttpClient, RequestOptions};
use crate::integrations::support;

static LIST_SITES: EndpointDescriptor = EndpointDescriptor::get(
    "/sites",
    "https://docs.netlify.com/api/get-started/#sites",
    "List all sites for the current user",
);

static LIST_DEPLOYS: EndpointDescriptor = EndpointDescriptor::get(
    "/sites/{site_id}/deploys",
    "https://docs.netlify.com/api/get-started/#list-site-deploys",
    "List all deploys for a site",
);

static GET_DEPLOY: EndpointDescriptor = EndpointDescriptor::get(
    "/deploys/{deploy_id}",
    "https://docs.netlify.com/api/get-started/#get-deploy",
    "Get a specific deploy by ID",
);

static GET_USER: EndpointDescriptor = EndpointDescriptor::get(
    "/user",
    "https://docs.netlify.com/api/get-started/#get-current-user",
    "Get the current user",
);

/// Page size used when resolving a site name
const SITE_LOOKUP_PAGE: usize = 100;

pub const LOGS_NOT_AVAILABLE: &str = "Deploy logs not available for this deployment.";

/// Netlify deploys through the REST API
///
/// Netlify addresses deploy lists by site id; site names are resolved
/// through `/sites` once per credential and remembered.
#[derive(Debug)]
pub struct NetlifyAdapter {
    api: ApiClient,
    site_ids: Mutex<HashMap<(String, String), String>>,
}

impl NetlifyAdapter {
    pub fn new(http: HttpClient, rate_limit: &RateLimitConfig) -> Self {
        Self { api: ApiClient::new(http, rate_limit), site_ids: Mutex::new(HashMap::new()) }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api = support::api_client(
            &config.platforms.netlify_api_url,
            &config.http,
            &config.rate_limit,
        )?;
        Ok(Self { api, site_ids: Mutex::new(HashMap::new()) })
    }

    async fn sites(&self, credential: &str, per_page: usize) -> Result<Vec<NetlifySite>> {
        let options = RequestOptions::new().bearer(credential).query("per_page", per_page);
        Ok(self.api.get(LIST_SITES.target(), options).await?)
    }

    /// Site id for a site name or id
    async fn site_id(&self, site: &str, credential: &str) -> Result<String> {
        let key = (credential.to_string(), site.to_string());
        let cached = self.site_ids.lock().get(&key).cloned();
        if let Some(id) = cached {
            return Ok(id);
        }

        let sites = self.sites(credential, SITE_LOOKUP_PAGE).await?;
        let id = sites
            .into_iter()
            .find(|candidate| candidate.name == site || candidate.id == site)
            .map(|found| found.id)
            .ok_or_else(|| DeployError::NotFound(format!("Site not found: {site}")))?;

        debug!(site, site_id = %id, "Resolved Netlify site");
        self.site_ids.lock().insert(key, id.clone());
        Ok(id)
    }

    async fn deploy(&self, deploy_id: &str, credential: &str) -> Result<NetlifyDeploy> {
        let target = GET_DEPLOY.bind(&[("deploy_id", deploy_id)]);
        Ok(self.api.get(target, RequestOptions::new().bearer(credential)).await?)
    }
}

#[async_trait]
impl PlatformAdapter for NetlifyAdapter {
    fn name(&self) -> &'static str {
        PLATFORM_NETLIFY
    }

    async fn authenticate(&self, credential: &str) -> Result<bool> {
        let options = RequestOptions::new().bearer(credential);
        match self.api.get::<NetlifyUser>(GET_USER.target(), options).await {
            Ok(user) => Ok(user.id.is_some_and(|id| !id.is_empty())),
            Err(err) => {
                debug!(error = %err, "Netlify token rejected");
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
        let site_id = self.site_id(project, credential).await?;
        let target = LIST_DEPLOYS.bind(&[("site_id", site_id.as_str())]);
        let options = RequestOptions::new().bearer(credential).query("per_page", limit);
        let deploys: Vec<NetlifyDeploy> = self.api.get(target, options).await?;

        Ok(deploys.into_iter().map(NetlifyDeploy::into_record).collect())
    }

    async fn deployment(&self, deployment_id: &str, credential: &str) -> Result<DeploymentRecord> {
        Ok(self.deploy(deployment_id, credential).await?.into_record())
    }

    #[instrument(skip(self, credential))]
    async fn deployment_logs(&self, deployment_id: &str, credential: &str) -> Result<String> {
        let deploy = self.deploy(deployment_id, credential).await?;
        match deploy.log_url() {
            Some(url) => Ok(self.api.fetch_text(url).await?),
            None => Ok(LOGS_NOT_AVAILABLE.to_string()),
        }
    }

    async fn list_projects(&self, credential: &str, limit: usize) -> Result<Vec<ProjectSummary>> {
        let sites = self.sites(credential, limit).await?;
        Ok(sites.into_iter().take(limit).map(ProjectSummary::from).collect())
    }
}
