//! `get_deployment_logs`

use deploywatch_common::resilience::Clock;
use deploywatch_domain::{FailureKind, LogFilter, LogReport, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{require, to_data};
use crate::context::ToolHandler;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsArgs {
    pub platform: String,
    /// Deployment id, or `latest` together with `project`
    pub deployment_id: String,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub filter: LogFilter,
    #[serde(default)]
    pub token: Option<String>,
}

/// Counts over the filtered log text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub has_errors: bool,
}

impl LogsSummary {
    pub fn of(report: &LogReport) -> Self {
        let lower = report.logs.to_lowercase();
        Self {
            error_count: lower.matches("error").count(),
            warning_count: lower.matches("warning").count(),
            has_errors: report.analysis.kind != FailureKind::Unknown,
        }
    }
}

#[derive(Debug, Serialize)]
struct LogsResult {
    #[serde(flatten)]
    report: LogReport,
    summary: LogsSummary,
}

pub async fn get_deployment_logs<C>(handler: &ToolHandler<C>, args: LogsArgs) -> Result<Value>
where
    C: Clock + Clone,
{
    require("deploymentId", &args.deployment_id)?;
    let intelligence = handler.intelligence(&args.platform)?;

    let report = intelligence
        .deployment_logs(
            &args.deployment_id,
            args.project.as_deref(),
            args.filter,
            args.token.as_deref(),
        )
        .await?;
    let summary = LogsSummary::of(&report);

    to_data(&LogsResult { report, summary })
}

#[cfg(test)]
mod tests {
    use deploywatch_domain::ErrorAnalysis;

    use super::*;

    #[test]
    fn test_summary_counts_case_insensitively() {
        let report = LogReport {
            deployment_id: "d1".to_string(),
            logs: "ERROR: one\nWarning: two\nerror: three".to_string(),
            analysis: ErrorAnalysis {
                kind: FailureKind::Build,
                message: "Build failed".to_string(),
                location: None,
                suggestion: None,
            },
        };

        let summary = LogsSummary::of(&report);
        assert_eq!(summary.error_count, 2);
        assert_eq!(summary.warning_count, 1);
        assert!(summary.has_errors);
    }

    #[test]
    fn test_filter_defaults_to_error() {
        let args: LogsArgs = serde_json::from_value(serde_json::json!({
            "platform": "vercel",
            "deploymentId": "latest",
            "project": "web"
        }))
        .unwrap();
        assert_eq!(args.filter, LogFilter::Error);
    }
}
