//! Port interfaces for deployment platforms

use std::sync::Arc;

use async_trait::async_trait;
use deploywatch_domain::{DeploymentRecord, DeploymentStatus, ProjectSummary, Result};

/// One hosting platform (Vercel, Netlify, Cloudflare Pages, ...)
///
/// Implementations map the platform's own schema onto the normalized domain
/// types. Every call takes the credential explicitly; adapters hold no
/// per-user state besides caches keyed by credential.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Platform identifier, e.g. `"vercel"`
    fn name(&self) -> &'static str;

    /// Check whether the credential is accepted
    async fn authenticate(&self, credential: &str) -> Result<bool>;

    /// Most recent deployments of a project, newest first
    async fn recent_deployments(
        &self,
        project: &str,
        credential: &str,
        limit: usize,
    ) -> Result<Vec<DeploymentRecord>>;

    /// A single deployment by id
    async fn deployment(&self, deployment_id: &str, credential: &str) -> Result<DeploymentRecord>;

    /// Raw build log text, one entry per line
    async fn deployment_logs(&self, deployment_id: &str, credential: &str) -> Result<String>;

    /// Projects visible to the credential
    async fn list_projects(&self, credential: &str, limit: usize) -> Result<Vec<ProjectSummary>>;

    /// Normalized status of the latest deployment
    async fn latest_deployment(&self, project: &str, credential: &str) -> Result<DeploymentStatus> {
        let recent = self.recent_deployments(project, credential, 1).await?;
        Ok(match recent.first() {
            Some(record) => record.to_status(self.name()),
            None => DeploymentStatus::unknown(self.name(), project),
        })
    }
}

/// Builds adapters by platform name
pub trait AdapterFactory: Send + Sync {
    /// Create the adapter for `platform`; unknown names are invalid input
    fn create(&self, platform: &str) -> Result<Arc<dyn PlatformAdapter>>;

    /// Platform names this factory understands
    fn supported_platforms(&self) -> Vec<&'static str>;
}

/// Looks up a credential when the caller did not pass one
pub trait CredentialSource: Send + Sync {
    fn credential(&self, platform: &str) -> Option<String>;
}

/// No ambient credentials at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn credential(&self, _platform: &str) -> Option<String> {
        None
    }
}
