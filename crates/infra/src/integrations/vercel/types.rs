//! Vercel REST API payloads
//!
//! Only the fields the adapter reads are modelled; everything is optional
//! because list and detail endpoints return different subsets.

use deploywatch_domain::{CommitInfo, DeploymentRecord, DeploymentState, ProjectSummary};
use serde::Deserialize;

use crate::integrations::support::{first_present, from_millis, https_url};

/// A deployment from `/v6/deployments` or `/v13/deployments/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelDeployment {
    /// List responses carry `uid`
    #[serde(default)]
    pub uid: Option<String>,
    /// Detail responses carry `id`
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub ready_state: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub building_at: Option<i64>,
    #[serde(default)]
    pub ready: Option<i64>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub meta: Option<VercelMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelMeta {
    #[serde(default)]
    pub github_commit_sha: Option<String>,
    #[serde(default)]
    pub github_commit_message: Option<String>,
    #[serde(default)]
    pub github_commit_author_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VercelDeploymentsResponse {
    #[serde(default)]
    pub deployments: Vec<VercelDeployment>,
}

/// One entry of `/v2/deployments/{id}/events`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VercelEvent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub payload: Option<VercelEventPayload>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VercelEventPayload {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub latest_deployments: Vec<VercelProjectDeployment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VercelProjectDeployment {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VercelProjectsResponse {
    #[serde(default)]
    pub projects: Vec<VercelProject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VercelUserResponse {
    pub user: VercelUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VercelUser {
    #[serde(default, alias = "uid")]
    pub id: Option<String>,
}

/// Lifecycle from `readyState`, falling back to the legacy `state` field
pub fn map_state(ready_state: Option<&str>, state: Option<&str>) -> DeploymentState {
    match ready_state.or(state).unwrap_or_default() {
        "QUEUED" | "INITIALIZING" => DeploymentState::Initializing,
        "BUILDING" => DeploymentState::Building,
        "UPLOADING" => DeploymentState::Uploading,
        "DEPLOYING" => DeploymentState::Deploying,
        "READY" => DeploymentState::Ready,
        "ERROR" => DeploymentState::Error,
        "CANCELED" => DeploymentState::Canceled,
        _ => DeploymentState::Unknown,
    }
}

impl VercelDeployment {
    pub fn deployment_id(&self) -> &str {
        first_present(&[self.uid.as_deref(), self.id.as_deref()]).unwrap_or_default()
    }

    pub fn into_record(self) -> DeploymentRecord {
        let id = self.deployment_id().to_string();
        let state = map_state(self.ready_state.as_deref(), self.state.as_deref());
        let commit = self.meta.and_then(|meta| {
            CommitInfo {
                sha: meta.github_commit_sha,
                message: meta.github_commit_message,
                author: meta.github_commit_author_name,
            }
            .non_empty()
        });

        DeploymentRecord {
            id,
            state,
            url: self.url.as_deref().filter(|url| !url.is_empty()).map(https_url),
            project_name: self.name,
            environment: Some(self.target.unwrap_or_else(|| "production".to_string())),
            created_at: from_millis(self.created_at),
            building_at: from_millis(self.building_at.or(self.created_at)),
            ready_at: from_millis(self.ready),
            commit,
        }
    }
}

impl VercelEvent {
    /// Text of a stdout/stderr event
    pub fn output_line(&self) -> Option<&str> {
        match self.kind.as_deref() {
            Some("stdout" | "stderr") => first_present(&[
                self.payload.as_ref().and_then(|payload| payload.text.as_deref()),
                self.text.as_deref(),
            ]),
            _ => None,
        }
    }
}

impl From<VercelProject> for ProjectSummary {
    fn from(project: VercelProject) -> Self {
        let url = project
            .latest_deployments
            .iter()
            .find_map(|deployment| deployment.url.as_deref())
            .map(https_url);

        Self { id: project.id, name: project.name, url, updated_at: from_millis(project.updated_at) }
    }
}
