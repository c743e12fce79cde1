//! Per-platform deployment intelligence
//!
//! One `DeploymentIntelligence` wraps one platform adapter. The tool layer
//! caches instances per platform and routes every tool call through them.

use std::sync::Arc;

use deploywatch_domain::constants::{MSG_NO_DEPLOYMENT, MSG_NO_MATCHING_LOGS, MSG_NO_TOKEN};
use deploywatch_domain::{
    DeployError, DeploymentComparison, DeploymentStatus, LogFilter, LogReport, ProjectSummary,
    Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::watch::{DeploymentWatch, WatchRequest, WatchSettings};
use super::{compare, logs};
use crate::platform::ports::{CredentialSource, PlatformAdapter};

/// Deployment id alias accepted by [`DeploymentIntelligence::deployment_logs`]
pub const LATEST_DEPLOYMENT: &str = "latest";

/// Status, watch, comparison and log queries for one platform
pub struct DeploymentIntelligence {
    adapter: Arc<dyn PlatformAdapter>,
    credentials: Arc<dyn CredentialSource>,
    watch_settings: WatchSettings,
}

impl DeploymentIntelligence {
    pub fn new(adapter: Arc<dyn PlatformAdapter>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self { adapter, credentials, watch_settings: WatchSettings::default() }
    }

    pub fn with_watch_settings(mut self, settings: WatchSettings) -> Self {
        self.watch_settings = settings;
        self
    }

    /// Platform identifier of the wrapped adapter
    pub fn platform(&self) -> &'static str {
        self.adapter.name()
    }

    pub fn adapter(&self) -> &Arc<dyn PlatformAdapter> {
        &self.adapter
    }

    /// Explicit non-empty credential first, then the credential source
    pub fn resolve_credential(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .or_else(|| self.credentials.credential(self.platform()))
    }

    fn require_credential(&self, explicit: Option<&str>) -> Result<String> {
        self.resolve_credential(explicit).ok_or_else(|| DeployError::Auth(MSG_NO_TOKEN.to_string()))
    }

    /// Status of the project's latest deployment
    #[instrument(skip(self, credential), fields(platform = self.platform()))]
    pub async fn latest_status(
        &self,
        project: &str,
        credential: Option<&str>,
    ) -> Result<DeploymentStatus> {
        let credential = self.require_credential(credential)?;
        self.adapter.latest_deployment(project, &credential).await
    }

    /// Statuses of the `limit` most recent deployments, newest first.
    ///
    /// A project without deployments yields a single `unknown` status.
    #[instrument(skip(self, credential), fields(platform = self.platform()))]
    pub async fn recent_statuses(
        &self,
        project: &str,
        credential: Option<&str>,
        limit: usize,
    ) -> Result<Vec<DeploymentStatus>> {
        let credential = self.require_credential(credential)?;
        let records = self.adapter.recent_deployments(project, &credential, limit.max(1)).await?;

        if records.is_empty() {
            return Ok(vec![DeploymentStatus::unknown(self.platform(), project)]);
        }
        Ok(records.iter().map(|record| record.to_status(self.platform())).collect())
    }

    /// Start watching a deployment.
    ///
    /// Credential problems surface as the watch's first event, not as an
    /// error here.
    pub fn watch(
        &self,
        project: &str,
        deployment_id: Option<&str>,
        credential: Option<&str>,
        cancel: CancellationToken,
    ) -> DeploymentWatch {
        let request = WatchRequest {
            project: project.to_string(),
            deployment_id: deployment_id.filter(|id| !id.is_empty()).map(str::to_string),
            credential: self.resolve_credential(credential),
        };
        DeploymentWatch::new(Arc::clone(&self.adapter), request, self.watch_settings.clone(), cancel)
    }

    /// Compare the latest deployment with the one before it.
    ///
    /// Only a missing credential is an error. Platform failures are logged
    /// and yield `None`, like a history too short to compare.
    #[instrument(skip(self, credential), fields(platform = self.platform()))]
    pub async fn compare_deployments(
        &self,
        project: &str,
        credential: Option<&str>,
        count: usize,
    ) -> Result<Option<DeploymentComparison>> {
        let credential = self.require_credential(credential)?;
        match compare::compare_recent(self.adapter.as_ref(), project, &credential, None, count).await
        {
            Ok(comparison) => Ok(comparison),
            Err(err) => {
                warn!(project, error = %err, "Deployment comparison unavailable");
                Ok(None)
            }
        }
    }

    /// Filtered build logs of a deployment plus their failure analysis.
    ///
    /// `deployment_id` may be [`LATEST_DEPLOYMENT`], in which case `project`
    /// is required to find it.
    #[instrument(skip(self, credential), fields(platform = self.platform()))]
    pub async fn deployment_logs(
        &self,
        deployment_id: &str,
        project: Option<&str>,
        filter: LogFilter,
        credential: Option<&str>,
    ) -> Result<LogReport> {
        let credential = self.require_credential(credential)?;

        let deployment_id = if deployment_id.is_empty() || deployment_id == LATEST_DEPLOYMENT {
            let project = project.filter(|p| !p.is_empty()).ok_or_else(|| {
                DeployError::InvalidInput(
                    "project is required to look up the latest deployment".to_string(),
                )
            })?;
            let recent = self.adapter.recent_deployments(project, &credential, 1).await?;
            recent
                .into_iter()
                .next()
                .map(|record| record.id)
                .ok_or_else(|| DeployError::NotFound(MSG_NO_DEPLOYMENT.to_string()))?
        } else {
            deployment_id.to_string()
        };

        let raw = self.adapter.deployment_logs(&deployment_id, &credential).await?;
        debug!(deployment_id = %deployment_id, bytes = raw.len(), "Fetched deployment logs");

        let filtered = logs::filter_logs(&raw, filter);
        let analysis = logs::analyze_logs(&filtered);
        let logs = if filtered.trim().is_empty() { MSG_NO_MATCHING_LOGS.to_string() } else { filtered };

        Ok(LogReport { deployment_id, logs, analysis })
    }

    /// Projects visible to the credential
    #[instrument(skip(self, credential), fields(platform = self.platform()))]
    pub async fn list_projects(
        &self,
        credential: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ProjectSummary>> {
        let credential = self.require_credential(credential)?;
        self.adapter.list_projects(&credential, limit.max(1)).await
    }
}

impl std::fmt::Debug for DeploymentIntelligence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentIntelligence")
            .field("platform", &self.platform())
            .field("watch_settings", &self.watch_settings)
            .finish_non_exhaustive()
    }
}
