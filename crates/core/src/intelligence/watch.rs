//! Deployment watch state machine
//!
//! A watch resolves which deployment to follow, then polls it at a
//! state-dependent cadence until the deployment reaches a terminal state or
//! the attempt/wall-clock budget runs out. It is pull-based: every call to
//! [`DeploymentWatch::step`] performs at most one platform round trip and
//! yields at most one event, so a consumer that stops pulling stops the
//! polling with it.
//!
//! Every path ends with exactly one terminal event (success, error or
//! warning), optionally followed by a single build-time comparison after a
//! success. Errors never escape as `Err`; they become events.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use deploywatch_domain::constants::{
    DEFAULT_COMPARISON_COUNT, DEPLOYMENT_ID_DISPLAY_LEN, MAX_DEPLOYMENT_WATCH_ATTEMPTS,
    MAX_WATCH_TIME_SECS, MSG_CHECK_DASHBOARD, MSG_NO_DEPLOYMENT, MSG_NO_TOKEN,
    MSG_WATCH_CANCELLED,
};
use deploywatch_domain::{
    DeploymentRecord, DeploymentState, PollIntervals, WatchConfig, WatchEvent, WatchEventDetails,
};
use futures::Stream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{compare, logs};
use crate::platform::ports::PlatformAdapter;

/// Budget and cadence of a watch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub max_attempts: u32,
    pub max_duration: Duration,
    pub intervals: PollIntervals,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_DEPLOYMENT_WATCH_ATTEMPTS,
            max_duration: Duration::from_secs(MAX_WATCH_TIME_SECS),
            intervals: PollIntervals::default(),
        }
    }
}

impl From<&WatchConfig> for WatchSettings {
    fn from(config: &WatchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            max_duration: config.max_duration(),
            intervals: config.intervals.clone(),
        }
    }
}

/// What to watch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchRequest {
    pub project: String,
    /// Follow this deployment instead of the project's latest one
    pub deployment_id: Option<String>,
    pub credential: Option<String>,
}

/// Outcome of one [`DeploymentWatch::step`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchStep {
    /// The step produced an event
    Emit(WatchEvent),
    /// The step made progress without anything to report
    Pending,
    /// The watch is over; further steps keep returning `Finished`
    Finished,
}

#[derive(Debug)]
enum Phase {
    Resolve,
    Poll { deployment_id: String, started: Instant },
    Compare { deployment_id: String },
    Done,
}

/// A lazily evaluated, finite sequence of [`WatchEvent`]s for one deployment
pub struct DeploymentWatch {
    adapter: Arc<dyn PlatformAdapter>,
    request: WatchRequest,
    settings: WatchSettings,
    cancel: CancellationToken,
    phase: Phase,
    last_state: Option<DeploymentState>,
    attempts: u32,
    next_delay: Option<Duration>,
}

impl DeploymentWatch {
    pub fn new(
        adapter: Arc<dyn PlatformAdapter>,
        request: WatchRequest,
        settings: WatchSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            adapter,
            request,
            settings,
            cancel,
            phase: Phase::Resolve,
            last_state: None,
            attempts: 0,
            next_delay: None,
        }
    }

    /// Polls made so far, failed polls included
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Last lifecycle state observed
    pub fn last_state(&self) -> Option<DeploymentState> {
        self.last_state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Pull the next event; `None` once the watch is over
    pub async fn next_event(&mut self) -> Option<WatchEvent> {
        loop {
            match self.step().await {
                WatchStep::Emit(event) => return Some(event),
                WatchStep::Pending => continue,
                WatchStep::Finished => return None,
            }
        }
    }

    /// Drain the watch into a vector
    pub async fn collect(mut self) -> Vec<WatchEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    /// Adapt the watch into a `Stream` of events
    pub fn into_stream(self) -> impl Stream<Item = WatchEvent> + Send {
        futures::stream::unfold(self, |mut watch| async move {
            watch.next_event().await.map(|event| (event, watch))
        })
    }

    /// Advance the state machine by one step
    pub async fn step(&mut self) -> WatchStep {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Resolve => self.resolve().await,
            Phase::Poll { deployment_id, started } => self.poll(deployment_id, started).await,
            Phase::Compare { deployment_id } => self.compare(&deployment_id).await,
            Phase::Done => WatchStep::Finished,
        }
    }

    async fn resolve(&mut self) -> WatchStep {
        let Some(credential) = self.request.credential.clone() else {
            return WatchStep::Emit(WatchEvent::error(MSG_NO_TOKEN));
        };

        let deployment_id = match self.request.deployment_id.clone() {
            Some(id) => id,
            None => {
                let adapter = Arc::clone(&self.adapter);
                let project = self.request.project.clone();
                let lookup = adapter.recent_deployments(&project, &credential, 1);
                match self.cancellable(lookup).await {
                    None => return self.cancelled(),
                    Some(Err(err)) => {
                        return WatchStep::Emit(WatchEvent::error(format!(
                            "Error watching deployment: {}",
                            err.message()
                        )))
                    }
                    Some(Ok(recent)) => match recent.into_iter().next() {
                        Some(record) => record.id,
                        None => return WatchStep::Emit(WatchEvent::error(MSG_NO_DEPLOYMENT)),
                    },
                }
            }
        };

        info!(
            platform = self.adapter.name(),
            project = %self.request.project,
            deployment_id = %deployment_id,
            "Watching deployment"
        );

        let short_id: String = deployment_id.chars().take(DEPLOYMENT_ID_DISPLAY_LEN).collect();
        self.phase = Phase::Poll { deployment_id, started: Instant::now() };
        WatchStep::Emit(WatchEvent::progress(format!("Starting to watch deployment {short_id}...")))
    }

    async fn poll(&mut self, deployment_id: String, started: Instant) -> WatchStep {
        if let Some(delay) = self.next_delay.take() {
            let cancel = self.cancel.clone();
            tokio::select! {
                biased;
                () = cancel.cancelled() => return self.cancelled(),
                () = tokio::time::sleep(delay) => {}
            }
        }

        if self.cancel.is_cancelled() {
            return self.cancelled();
        }

        if self.attempts >= self.settings.max_attempts
            || started.elapsed() >= self.settings.max_duration
        {
            return WatchStep::Emit(self.timed_out(started));
        }

        // Credential presence was checked during resolution.
        let credential = self.request.credential.clone().unwrap_or_default();
        let adapter = Arc::clone(&self.adapter);
        let result = match self.cancellable(adapter.deployment(&deployment_id, &credential)).await {
            None => return self.cancelled(),
            Some(result) => result,
        };
        self.attempts += 1;

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    deployment_id = %deployment_id,
                    attempt = self.attempts,
                    error = %err,
                    "Deployment poll failed"
                );
                let state = self.last_state.unwrap_or(DeploymentState::Unknown);
                return self.schedule_next(deployment_id, started, state, None);
            }
        };

        let state = record.state;
        let changed = self.last_state != Some(state);
        self.last_state = Some(state);
        debug!(deployment_id = %deployment_id, ?state, changed, "Polled deployment");

        match state {
            DeploymentState::Ready => {
                self.phase = Phase::Compare { deployment_id };
                WatchStep::Emit(ready_event(&record))
            }
            DeploymentState::Error | DeploymentState::Canceled => {
                WatchStep::Emit(self.failure_event(&deployment_id, &credential).await)
            }
            _ => {
                let event = changed.then(|| WatchEvent::progress(state_message(state)));
                self.schedule_next(deployment_id, started, state, event)
            }
        }
    }

    fn schedule_next(
        &mut self,
        deployment_id: String,
        started: Instant,
        state: DeploymentState,
        event: Option<WatchEvent>,
    ) -> WatchStep {
        let delay = self.settings.intervals.for_state(state);
        if !delay.is_zero() {
            self.next_delay = Some(delay);
            self.phase = Phase::Poll { deployment_id, started };
        }

        match event {
            Some(event) => WatchStep::Emit(event),
            None => WatchStep::Pending,
        }
    }

    async fn failure_event(&mut self, deployment_id: &str, credential: &str) -> WatchEvent {
        let adapter = Arc::clone(&self.adapter);
        let analysis = match self.cancellable(adapter.deployment_logs(deployment_id, credential)).await
        {
            Some(Ok(text)) => logs::analyze_logs(&text),
            Some(Err(err)) => {
                debug!(error = %err, "Could not fetch logs for failed deployment");
                logs::logs_unavailable()
            }
            None => logs::logs_unavailable(),
        };

        WatchEvent::error(format!("Deployment failed: {}", analysis.message)).with_details(
            WatchEventDetails {
                suggestion: analysis.suggestion,
                file: analysis.location,
                ..WatchEventDetails::default()
            },
        )
    }

    async fn compare(&mut self, deployment_id: &str) -> WatchStep {
        let Some(credential) = self.request.credential.clone() else {
            return WatchStep::Finished;
        };

        let adapter = Arc::clone(&self.adapter);
        let project = self.request.project.clone();
        let comparison = compare::compare_recent(
            adapter.as_ref(),
            &project,
            &credential,
            Some(deployment_id),
            DEFAULT_COMPARISON_COUNT,
        );

        match self.cancellable(comparison).await {
            Some(Ok(Some(comparison))) => {
                let message = comparison.build_time.summary();
                WatchStep::Emit(WatchEvent::progress(message).with_details(WatchEventDetails {
                    comparison: Some(Box::new(comparison)),
                    ..WatchEventDetails::default()
                }))
            }
            Some(Err(err)) => {
                debug!(error = %err, "Skipping comparison with previous deployment");
                WatchStep::Finished
            }
            Some(Ok(None)) | None => WatchStep::Finished,
        }
    }

    /// Reports the wall-clock time actually spent, whichever budget ran out
    fn timed_out(&self, started: Instant) -> WatchEvent {
        WatchEvent::warning(format!(
            "Deployment watch timed out after {} seconds. The deployment may still be running.",
            started.elapsed().as_secs()
        ))
        .with_suggestion(MSG_CHECK_DASHBOARD)
    }

    fn cancelled(&mut self) -> WatchStep {
        self.phase = Phase::Done;
        WatchStep::Emit(WatchEvent::warning(MSG_WATCH_CANCELLED))
    }

    async fn cancellable<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            output = future => Some(output),
        }
    }
}

fn ready_event(record: &DeploymentRecord) -> WatchEvent {
    WatchEvent::success("Deployment successful!").with_details(WatchEventDetails {
        url: record.url.clone(),
        duration: record.build_duration_secs(),
        ..WatchEventDetails::default()
    })
}

fn state_message(state: DeploymentState) -> &'static str {
    match state {
        DeploymentState::Initializing => "Initializing deployment...",
        DeploymentState::Building => "Building application...",
        DeploymentState::Uploading => "Uploading to edge network...",
        DeploymentState::Deploying => "Deploying to production...",
        DeploymentState::Ready => "Deployment ready",
        DeploymentState::Error | DeploymentState::Canceled => "Deployment failed",
        DeploymentState::Unknown => "Waiting for deployment status...",
    }
}
