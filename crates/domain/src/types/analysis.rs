//! Log filtering and failure analysis results

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Coarse failure category derived from build logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    #[serde(rename = "BUILD")]
    Build,
    #[serde(rename = "TYPESCRIPT")]
    TypeScript,
    #[serde(rename = "MISSING_DEPENDENCY")]
    MissingDependency,
    #[serde(rename = "ENV_VAR")]
    EnvVar,
    #[serde(rename = "TIMEOUT")]
    Timeout,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// Result of scanning logs after a failed deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    #[serde(rename = "type")]
    pub kind: FailureKind,
    pub message: String,
    /// `file:line:column` of the first located error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Which log lines to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFilter {
    #[default]
    Error,
    Warning,
    All,
}

impl_domain_status_conversions!(LogFilter {
    Error => "error",
    Warning => "warning",
    All => "all",
});

/// Filtered logs plus their analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogReport {
    pub deployment_id: String,
    pub logs: String,
    pub analysis: ErrorAnalysis,
}
