//! Deployment lifecycle and normalized status types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Lifecycle state shared by every platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentState {
    Initializing,
    Building,
    Uploading,
    Deploying,
    Ready,
    Error,
    Canceled,
    Unknown,
}

impl_domain_status_conversions!(DeploymentState {
    Initializing => "initializing",
    Building => "building",
    Uploading => "uploading",
    Deploying => "deploying",
    Ready => "ready",
    Error => "error",
    Canceled => "canceled",
    Unknown => "unknown",
});

impl DeploymentState {
    /// READY, ERROR and CANCELED end a deployment
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error | Self::Canceled)
    }

    /// Whether this terminal state means the deployment failed
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error | Self::Canceled)
    }

    /// Coarse status reported to callers
    pub fn outcome(self) -> DeploymentOutcome {
        match self {
            Self::Ready => DeploymentOutcome::Success,
            Self::Error | Self::Canceled => DeploymentOutcome::Failed,
            Self::Initializing | Self::Building | Self::Uploading | Self::Deploying => {
                DeploymentOutcome::Building
            }
            Self::Unknown => DeploymentOutcome::Unknown,
        }
    }
}

/// Coarse deployment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentOutcome {
    Success,
    Failed,
    Building,
    Error,
    Unknown,
}

impl_domain_status_conversions!(DeploymentOutcome {
    Success => "success",
    Failed => "failed",
    Building => "building",
    Error => "error",
    Unknown => "unknown",
});

/// Source commit behind a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl CommitInfo {
    /// `None` when every field is missing
    pub fn non_empty(self) -> Option<Self> {
        if self.sha.is_none() && self.message.is_none() && self.author.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

/// One deployment as seen by the watch and comparison logic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub id: String,
    pub state: DeploymentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
}

impl DeploymentRecord {
    /// A record with only an id and a state
    pub fn new(id: impl Into<String>, state: DeploymentState) -> Self {
        Self {
            id: id.into(),
            state,
            url: None,
            project_name: None,
            environment: None,
            created_at: None,
            building_at: None,
            ready_at: None,
            commit: None,
        }
    }

    /// Build time in whole seconds, when both timestamps are known
    pub fn build_duration_secs(&self) -> Option<i64> {
        let building = self.building_at?;
        let ready = self.ready_at?;
        let millis = (ready - building).num_milliseconds();
        Some((millis as f64 / 1000.0).round() as i64)
    }

    /// Normalize into the caller-facing status shape
    pub fn to_status(&self, platform: &str) -> DeploymentStatus {
        DeploymentStatus {
            id: Some(self.id.clone()),
            status: self.state.outcome(),
            url: self.url.clone(),
            project_name: self.project_name.clone(),
            platform: Some(platform.to_string()),
            timestamp: self.created_at,
            duration: self.build_duration_secs(),
            environment: self.environment.clone(),
            commit: self.commit.clone(),
        }
    }
}

/// Caller-facing deployment status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: DeploymentOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Build time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
}

impl DeploymentStatus {
    /// Status reported when a project has no deployments yet
    pub fn unknown(platform: &str, project: &str) -> Self {
        Self {
            id: None,
            status: DeploymentOutcome::Unknown,
            url: None,
            project_name: Some(project.to_string()),
            platform: Some(platform.to_string()),
            timestamp: None,
            duration: None,
            environment: None,
            commit: None,
        }
    }
}

/// A project (Vercel project, Netlify site, Cloudflare Pages project)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
