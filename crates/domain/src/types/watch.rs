//! Events emitted while watching a deployment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::comparison::DeploymentComparison;

/// Event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchEventKind {
    Progress,
    Warning,
    Success,
    Error,
}

/// Optional structured payload of an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEventDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Build time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `file:line:column` of a located build error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Box<DeploymentComparison>>,
}

/// One step of a deployment watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    #[serde(rename = "type")]
    pub kind: WatchEventKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<WatchEventDetails>,
}

impl WatchEvent {
    fn new(kind: WatchEventKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), timestamp: Utc::now(), details: None }
    }

    pub fn progress(message: impl Into<String>) -> Self {
        Self::new(WatchEventKind::Progress, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(WatchEventKind::Warning, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(WatchEventKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(WatchEventKind::Error, message)
    }

    pub fn with_details(mut self, details: WatchEventDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.details.get_or_insert_with(WatchEventDetails::default).suggestion =
            Some(suggestion.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.kind == WatchEventKind::Success
    }

    pub fn is_error(&self) -> bool {
        self.kind == WatchEventKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = WatchEvent::warning("timed out").with_suggestion("check the dashboard");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "warning");
        assert_eq!(json["message"], "timed out");
        assert_eq!(json["details"]["suggestion"], "check the dashboard");
        assert!(json["details"].get("url").is_none());
    }
}
