//! Netlify REST API payloads

use chrono::Duration;
use deploywatch_domain::{CommitInfo, DeploymentRecord, DeploymentState, ProjectSummary};
use serde::Deserialize;

use crate::integrations::support::{first_present, https_url, parse_timestamp};

/// A deploy from `/sites/{site_id}/deploys` or `/deploys/{deploy_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetlifyDeploy {
    pub id: String,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ssl_url: Option<String>,
    #[serde(default)]
    pub deploy_url: Option<String>,
    #[serde(default)]
    pub deploy_ssl_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub commit_ref: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    /// Milliseconds
    #[serde(default)]
    pub deploy_time: Option<i64>,
    #[serde(default)]
    pub log_access_attributes: Option<LogAccessAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogAccessAttributes {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetlifySite {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ssl_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetlifyUser {
    #[serde(default)]
    pub id: Option<String>,
}

/// Netlify deploy state to lifecycle state
pub fn map_state(state: Option<&str>) -> DeploymentState {
    match state.unwrap_or_default() {
        "new" | "pending_review" | "accepted" | "enqueued" => DeploymentState::Initializing,
        "building" | "retrying" => DeploymentState::Building,
        "uploading" | "uploaded" => DeploymentState::Uploading,
        "preparing" | "prepared" | "processing" => DeploymentState::Deploying,
        "ready" | "processed" => DeploymentState::Ready,
        "error" | "rejected" => DeploymentState::Error,
        _ => DeploymentState::Unknown,
    }
}

impl NetlifyDeploy {
    /// URL of the log stream, when Netlify exposes one
    pub fn log_url(&self) -> Option<&str> {
        self.log_access_attributes
            .as_ref()
            .and_then(|attrs| attrs.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    pub fn into_record(self) -> DeploymentRecord {
        let state = map_state(self.state.as_deref());
        let created_at = parse_timestamp(self.created_at.as_deref());
        // Without a publish time, a finished deploy still reports how long it took
        let ready_at = parse_timestamp(self.published_at.as_deref()).or_else(|| {
            match (state, created_at, self.deploy_time) {
                (DeploymentState::Ready, Some(start), Some(millis)) => {
                    Some(start + Duration::milliseconds(millis))
                }
                _ => None,
            }
        });
        let url = first_present(&[
            self.ssl_url.as_deref(),
            self.url.as_deref(),
            self.deploy_ssl_url.as_deref(),
            self.deploy_url.as_deref(),
        ])
        .map(https_url);
        let project_name = first_present(&[self.name.as_deref(), self.site_id.as_deref()])
            .map(str::to_string);
        let commit = self.commit_ref.filter(|sha| !sha.is_empty()).map(|sha| CommitInfo {
            sha: Some(sha),
            message: self.title.clone(),
            author: None,
        });

        DeploymentRecord {
            id: self.id,
            state,
            url,
            project_name,
            environment: Some(self.context.unwrap_or_else(|| "production".to_string())),
            created_at,
            building_at: created_at,
            ready_at,
            commit,
        }
    }
}

impl From<NetlifySite> for ProjectSummary {
    fn from(site: NetlifySite) -> Self {
        let url = first_present(&[site.ssl_url.as_deref(), site.url.as_deref()]).map(https_url);
        Self {
            url,
            updated_at: parse_timestamp(site.updated_at.as_deref()),
            id: site.id,
            name: site.name,
        }
    }
}
