//! Cloudflare Pages API payloads
//!
//! Every response is wrapped in the Cloudflare v4 envelope
//! (`success`, `errors`, `result`).

use deploywatch_domain::{CommitInfo, DeploymentRecord, DeploymentState, ProjectSummary};
use serde::Deserialize;

use crate::api::ApiError;
use crate::integrations::support::{https_url, parse_timestamp};

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<EnvelopeMessage>,
    pub result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeMessage {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// The `result`, or the first envelope error when `success` is false
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            let message = self
                .errors
                .iter()
                .find_map(|error| error.message.as_deref())
                .unwrap_or("Unknown error");
            return Err(ApiError::Platform(message.to_string()));
        }
        self.result
            .ok_or_else(|| ApiError::Platform("Response did not include a result".to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesStage {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub started_on: Option<String>,
    #[serde(default)]
    pub ended_on: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesDeployment {
    pub id: String,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub latest_stage: Option<PagesStage>,
    #[serde(default)]
    pub source: Option<PagesSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesSource {
    #[serde(default)]
    pub config: Option<PagesSourceConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesSourceConfig {
    #[serde(default)]
    pub commit_hash: Option<String>,
    #[serde(default)]
    pub commit_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagesProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub modified_on: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesLogs {
    #[serde(default)]
    pub data: Vec<PagesLogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagesLogEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
}

impl PagesLogEntry {
    pub fn format_line(&self) -> String {
        format!("[{}] {}: {}", self.timestamp, self.level.to_uppercase(), self.message)
    }
}

/// Lifecycle from the latest stage's name and status
pub fn map_stage(stage: Option<&PagesStage>) -> DeploymentState {
    let Some(stage) = stage else {
        return DeploymentState::Unknown;
    };
    let name = stage.name.as_deref().unwrap_or_default();

    match stage.status.as_deref().unwrap_or_default() {
        "failure" | "failed" => DeploymentState::Error,
        "canceled" => DeploymentState::Canceled,
        "success" => match name {
            "deploy" => DeploymentState::Ready,
            "build" => DeploymentState::Deploying,
            _ => DeploymentState::Building,
        },
        "active" => match name {
            "queued" | "initialize" => DeploymentState::Initializing,
            "clone_repo" | "build" => DeploymentState::Building,
            "deploy" => DeploymentState::Deploying,
            _ => DeploymentState::Building,
        },
        _ => DeploymentState::Unknown,
    }
}

/// `project:deployment` id handed to callers
pub fn composite_id(project: &str, deployment_id: &str) -> String {
    format!("{project}:{deployment_id}")
}

impl PagesDeployment {
    /// Normalize; `project` is used when the payload omits `project_name`
    pub fn into_record(self, project: &str) -> DeploymentRecord {
        let state = map_stage(self.latest_stage.as_ref());
        let project_name = self.project_name.unwrap_or_else(|| project.to_string());
        let created_at = parse_timestamp(self.created_on.as_deref());
        let (building_at, ready_at) = match &self.latest_stage {
            Some(stage) => (
                parse_timestamp(stage.started_on.as_deref()).or(created_at),
                parse_timestamp(stage.ended_on.as_deref()),
            ),
            None => (None, None),
        };
        let commit = self.source.and_then(|source| source.config).and_then(|config| {
            CommitInfo { sha: config.commit_hash, message: config.commit_message, author: None }
                .non_empty()
        });

        DeploymentRecord {
            id: composite_id(&project_name, &self.id),
            state,
            url: self.url.as_deref().filter(|url| !url.is_empty()).map(https_url),
            project_name: Some(project_name),
            environment: self.environment,
            created_at,
            building_at,
            ready_at,
            commit,
        }
    }
}

impl From<PagesProject> for ProjectSummary {
    fn from(project: PagesProject) -> Self {
        let url = match project.domains.first().filter(|domain| !domain.is_empty()) {
            Some(domain) => Some(https_url(domain)),
            None => project
                .subdomain
                .as_deref()
                .filter(|sub| !sub.is_empty())
                .map(|sub| format!("https://{sub}.pages.dev")),
        };

        Self {
            url,
            updated_at: parse_timestamp(project.modified_on.as_deref()),
            id: project.id,
            name: project.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn stage(name: &str, status: &str) -> PagesStage {
        PagesStage {
            name: Some(name.to_string()),
            status: Some(status.to_string()),
            ..PagesStage::default()
        }
    }

    #[test]
    fn test_stage_mapping() {
        assert_eq!(map_stage(None), DeploymentState::Unknown);
        assert_eq!(map_stage(Some(&stage("queued", "active"))), DeploymentState::Initializing);
        assert_eq!(map_stage(Some(&stage("clone_repo", "active"))), DeploymentState::Building);
        assert_eq!(map_stage(Some(&stage("deploy", "active"))), DeploymentState::Deploying);
        assert_eq!(map_stage(Some(&stage("build", "success"))), DeploymentState::Deploying);
        assert_eq!(map_stage(Some(&stage("deploy", "success"))), DeploymentState::Ready);
        assert_eq!(map_stage(Some(&stage("build", "failure"))), DeploymentState::Error);
        assert_eq!(map_stage(Some(&stage("build", "canceled"))), DeploymentState::Canceled);
        assert_eq!(map_stage(Some(&stage("build", "skipped"))), DeploymentState::Unknown);
    }

    #[test]
    fn test_envelope_failure_carries_first_message() {
        let envelope: Envelope<PagesLogs> = serde_json::from_value(json!({
            "success": false,
            "errors": [{"code": 8000007, "message": "Project not found"}, {"message": "second"}],
            "result": null
        }))
        .unwrap();
        assert_eq!(
            envelope.into_result().unwrap_err(),
            ApiError::Platform("Project not found".to_string())
        );

        let empty: Envelope<PagesLogs> =
            serde_json::from_value(json!({"success": false, "errors": []})).unwrap();
        assert_eq!(empty.into_result().unwrap_err(), ApiError::Platform("Unknown error".to_string()));
    }

    #[test]
    fn test_envelope_result_needs_no_default() {
        #[derive(Debug, Deserialize)]
        struct Named {
            name: String,
        }

        let missing: Envelope<Named> = serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(
            missing.into_result().unwrap_err(),
            ApiError::Platform("Response did not include a result".to_string())
        );

        let present: Envelope<Named> =
            serde_json::from_value(json!({"success": true, "result": {"name": "site"}})).unwrap();
        assert_eq!(present.into_result().unwrap().name, "site");
    }

    #[test]
    fn test_into_record_uses_composite_id() {
        let deployment: PagesDeployment = serde_json::from_value(json!({
            "id": "abc",
            "project_name": "site",
            "environment": "preview",
            "url": "https://abc.site.pages.dev",
            "created_on": "2024-05-01T12:00:00Z",
            "latest_stage": {
                "name": "deploy",
                "status": "success",
                "started_on": "2024-05-01T12:00:10Z",
                "ended_on": "2024-05-01T12:01:10Z"
            },
            "source": {"config": {"commit_hash": "f00", "commit_message": "Ship it"}}
        }))
        .unwrap();

        let record = deployment.into_record("ignored");
        assert_eq!(record.id, "site:abc");
        assert_eq!(record.state, DeploymentState::Ready);
        assert_eq!(record.build_duration_secs(), Some(60));
        assert_eq!(record.environment.as_deref(), Some("preview"));
        assert_eq!(record.commit.unwrap().sha.as_deref(), Some("f00"));
    }

    #[test]
    fn test_project_url() {
        let with_domain: PagesProject = serde_json::from_value(json!({
            "id": "p1", "name": "site", "subdomain": "site", "domains": ["site.example.com"]
        }))
        .unwrap();
        let bare: PagesProject =
            serde_json::from_value(json!({"id": "p2", "name": "docs", "subdomain": "docs"})).unwrap();

        assert_eq!(ProjectSummary::from(with_domain).url.as_deref(), Some("https://site.example.com"));
        assert_eq!(ProjectSummary::from(bare).url.as_deref(), Some("https://docs.pages.dev"));
    }
}
