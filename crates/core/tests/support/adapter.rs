//! Scripted in-memory platform adapter
//!
//! Replays a fixed sequence of poll results so watch tests can drive the
//! state machine deterministically under a paused tokio clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use deploywatch_core::{CredentialSource, PlatformAdapter};
use deploywatch_domain::{
    DeployError, DeploymentRecord, DeploymentState, ProjectSummary, Result as DomainResult,
};
use parking_lot::Mutex;

/// Adapter whose `deployment` calls pop results from a script.
///
/// Once the script is down to its last entry, that entry is repeated.
pub struct ScriptedAdapter {
    polls: Mutex<VecDeque<DomainResult<DeploymentRecord>>>,
    recent: Mutex<DomainResult<Vec<DeploymentRecord>>>,
    logs: Mutex<Option<DomainResult<String>>>,
    poll_calls: AtomicUsize,
    recent_calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self {
            polls: Mutex::new(VecDeque::new()),
            recent: Mutex::new(Ok(Vec::new())),
            logs: Mutex::new(None),
            poll_calls: AtomicUsize::new(0),
            recent_calls: AtomicUsize::new(0),
        }
    }

    /// Poll results, replayed in order
    pub fn with_states(self, id: &str, states: &[DeploymentState]) -> Self {
        {
            let mut polls = self.polls.lock();
            for state in states {
                polls.push_back(Ok(record(id, *state)));
            }
        }
        self
    }

    pub fn with_poll(self, result: DomainResult<DeploymentRecord>) -> Self {
        self.polls.lock().push_back(result);
        self
    }

    /// Deployments returned by `recent_deployments`, newest first
    pub fn with_recent(self, records: Vec<DeploymentRecord>) -> Self {
        *self.recent.lock() = Ok(records);
        self
    }

    pub fn with_recent_error(self, error: DeployError) -> Self {
        *self.recent.lock() = Err(error);
        self
    }

    pub fn with_logs(self, logs: DomainResult<String>) -> Self {
        *self.logs.lock() = Some(logs);
        self
    }

    pub fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::SeqCst)
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl PlatformAdapter for ScriptedAdapter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn authenticate(&self, credential: &str) -> DomainResult<bool> {
        Ok(!credential.is_empty())
    }

    async fn recent_deployments(
        &self,
        _project: &str,
        _credential: &str,
        limit: usize,
    ) -> DomainResult<Vec<DeploymentRecord>> {
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        self.recent.lock().clone().map(|records| records.into_iter().take(limit).collect())
    }

    async fn deployment(
        &self,
        deployment_id: &str,
        _credential: &str,
    ) -> DomainResult<DeploymentRecord> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        let mut polls = self.polls.lock();
        let next = if polls.len() > 1 { polls.pop_front() } else { polls.front().cloned() };
        next.unwrap_or_else(|| Err(DeployError::NotFound(format!("deployment {deployment_id}"))))
    }

    async fn deployment_logs(
        &self,
        _deployment_id: &str,
        _credential: &str,
    ) -> DomainResult<String> {
        self.logs
            .lock()
            .clone()
            .unwrap_or_else(|| Err(DeployError::Network("logs unavailable".to_string())))
    }

    async fn list_projects(
        &self,
        _credential: &str,
        limit: usize,
    ) -> DomainResult<Vec<ProjectSummary>> {
        let projects = (0..3)
            .map(|i| ProjectSummary {
                id: format!("prj_{i}"),
                name: format!("project-{i}"),
                url: None,
                updated_at: None,
            })
            .take(limit)
            .collect();
        Ok(projects)
    }
}

/// A record in `state`; READY records built in 42 seconds
pub fn record(id: &str, state: DeploymentState) -> DeploymentRecord {
    let mut record = DeploymentRecord::new(id, state);
    let created = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    record.created_at = Some(created);
    record.building_at = Some(created);
    record.url = Some(format!("https://{id}.example.app"));
    if state == DeploymentState::Ready {
        record.ready_at = Some(created + chrono::Duration::seconds(42));
    }
    record
}

/// A finished record created `created_secs` after the epoch, built in `build_secs`
pub fn finished(id: &str, created_secs: i64, build_secs: i64) -> DeploymentRecord {
    let mut record = DeploymentRecord::new(id, DeploymentState::Ready);
    let created = Utc.timestamp_opt(created_secs, 0).unwrap();
    record.created_at = Some(created);
    record.building_at = Some(created);
    record.ready_at = Some(created + chrono::Duration::seconds(build_secs));
    record
}

/// Credential source backed by a fixed token
pub struct FixedCredentials(pub Option<&'static str>);

impl CredentialSource for FixedCredentials {
    fn credential(&self, _platform: &str) -> Option<String> {
        self.0.map(str::to_string)
    }
}
