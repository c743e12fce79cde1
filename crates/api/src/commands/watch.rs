//! `watch_deployment`

use deploywatch_common::resilience::Clock;
use deploywatch_domain::{Result, WatchEvent, WatchEventKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{require, to_data};
use crate::context::ToolHandler;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchArgs {
    pub platform: String,
    pub project: String,
    /// Watch this deployment instead of the latest one
    #[serde(default)]
    pub deployment_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Summary status derived from the watch's terminal event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchOutcome {
    Success,
    Error,
    InProgress,
}

impl WatchOutcome {
    pub fn from_final_event(event: Option<&WatchEvent>) -> Self {
        match event.map(|event| event.kind) {
            Some(WatchEventKind::Success) => Self::Success,
            Some(WatchEventKind::Error) => Self::Error,
            _ => Self::InProgress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchResult {
    pub events: Vec<WatchEvent>,
    pub status: WatchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Build time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl WatchResult {
    /// The terminal event is the last non-progress one; a build-time
    /// comparison may trail a success.
    pub fn from_events(events: Vec<WatchEvent>) -> Self {
        let terminal = events
            .iter()
            .rev()
            .find(|event| event.kind != WatchEventKind::Progress)
            .or_else(|| events.last());
        let status = WatchOutcome::from_final_event(terminal);
        let details = terminal.and_then(|event| event.details.as_ref());
        let url = details.and_then(|details| details.url.clone());
        let duration = details.and_then(|details| details.duration);
        Self { events, status, url, duration }
    }
}

/// Run a watch to completion and return every event it produced
pub async fn watch_deployment<C>(handler: &ToolHandler<C>, args: WatchArgs) -> Result<Value>
where
    C: Clock + Clone,
{
    require("project", &args.project)?;
    let intelligence = handler.intelligence(&args.platform)?;

    let mut watch = intelligence.watch(
        &args.project,
        args.deployment_id.as_deref(),
        args.token.as_deref(),
        handler.watch_token(),
    );

    let mut events = Vec::new();
    while let Some(event) = watch.next_event().await {
        debug!(kind = ?event.kind, message = %event.message, "Watch event");
        events.push(event);
    }

    to_data(&WatchResult::from_events(events))
}

#[cfg(test)]
mod tests {
    use deploywatch_domain::WatchEventDetails;

    use super::*;

    #[test]
    fn test_outcome_from_final_event() {
        assert_eq!(WatchOutcome::from_final_event(None), WatchOutcome::InProgress);
        assert_eq!(
            WatchOutcome::from_final_event(Some(&WatchEvent::warning("still going"))),
            WatchOutcome::InProgress
        );
        assert_eq!(
            WatchOutcome::from_final_event(Some(&WatchEvent::error("boom"))),
            WatchOutcome::Error
        );
    }

    #[test]
    fn test_result_lifts_final_details() {
        let events = vec![
            WatchEvent::progress("Building application..."),
            WatchEvent::success("Deployment successful!").with_details(WatchEventDetails {
                url: Some("https://web.vercel.app".to_string()),
                duration: Some(42),
                ..WatchEventDetails::default()
            }),
        ];

        let result = WatchResult::from_events(events);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["url"], "https://web.vercel.app");
        assert_eq!(json["duration"], 42);
        assert_eq!(json["events"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_trailing_comparison_keeps_success() {
        let events = vec![
            WatchEvent::success("Deployment successful!"),
            WatchEvent::progress("Build time: 45s (15s slower than previous)"),
        ];

        assert_eq!(WatchResult::from_events(events).status, WatchOutcome::Success);
    }

    #[test]
    fn test_only_progress_is_in_progress() {
        let events = vec![WatchEvent::progress("Building application...")];
        assert_eq!(WatchResult::from_events(events).status, WatchOutcome::InProgress);
    }
}
