//! Tool commands - request dispatch onto the deployment intelligence layer

mod compare;
mod descriptors;
mod logs;
mod projects;
mod status;
mod watch;

use std::time::Instant;

use chrono::{DateTime, Utc};
use deploywatch_common::resilience::Clock;
use deploywatch_domain::{DeployError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

pub use compare::{compare_deployments, CompareArgs};
pub use descriptors::{tool_descriptors, ToolDescriptor};
pub use logs::{get_deployment_logs, LogsArgs, LogsSummary};
pub use projects::{list_projects, ProjectsArgs};
pub use status::{check_deployment_status, StatusArgs};
pub use watch::{watch_deployment, WatchArgs, WatchOutcome, WatchResult};

use crate::context::ToolHandler;
use crate::utils::logging::{error_label, log_command_execution};

pub const TOOL_CHECK_DEPLOYMENT_STATUS: &str = "check_deployment_status";
pub const TOOL_WATCH_DEPLOYMENT: &str = "watch_deployment";
pub const TOOL_COMPARE_DEPLOYMENTS: &str = "compare_deployments";
pub const TOOL_GET_DEPLOYMENT_LOGS: &str = "get_deployment_logs";
pub const TOOL_LIST_PROJECTS: &str = "list_projects";

pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Result of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool: String,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Deserialize tool arguments; a missing argument object counts as empty
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments)
        .map_err(|err| DeployError::InvalidInput(format!("Invalid arguments for {tool}: {err}")))
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|err| DeployError::Internal(format!("Failed to serialize tool result: {err}")))
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeployError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

impl<C> ToolHandler<C>
where
    C: Clock + Clone,
{
    /// Run the tool `name` with JSON `arguments`
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> Result<ToolOutput> {
        let start = Instant::now();
        let platform = arguments.get("platform").and_then(Value::as_str).map(str::to_string);

        let result = self.dispatch(name, arguments).await;

        log_command_execution(name, platform.as_deref(), start.elapsed(), result.is_ok());
        if let Err(err) = &result {
            debug!(tool = name, error_type = error_label(err), error = %err, "Tool call failed");
        }

        Ok(ToolOutput { tool: name.to_string(), timestamp: Utc::now(), data: result? })
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value> {
        match name {
            TOOL_CHECK_DEPLOYMENT_STATUS => {
                check_deployment_status(self, parse_args(name, arguments)?).await
            }
            TOOL_WATCH_DEPLOYMENT => watch_deployment(self, parse_args(name, arguments)?).await,
            TOOL_COMPARE_DEPLOYMENTS => compare_deployments(self, parse_args(name, arguments)?).await,
            TOOL_GET_DEPLOYMENT_LOGS => get_deployment_logs(self, parse_args(name, arguments)?).await,
            TOOL_LIST_PROJECTS => list_projects(self, parse_args(name, arguments)?).await,
            other => Err(DeployError::InvalidInput(format!("Unknown tool: {other}"))),
        }
    }

    /// Tool descriptors for `tools/list`
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        tool_descriptors(&self.supported_platforms())
    }

    /// Handle a `tools/list` or `tools/call` request
    pub async fn handle_request(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            METHOD_TOOLS_LIST => Ok(json!({ "tools": self.list_tools() })),
            METHOD_TOOLS_CALL => {
                let params: CallParams = serde_json::from_value(params).map_err(|err| {
                    DeployError::InvalidInput(format!("Invalid tools/call params: {err}"))
                })?;
                let output = self.handle_tool_call(&params.name, params.arguments).await?;
                to_data(&output)
            }
            other => Err(DeployError::InvalidInput(format!("Unknown method: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        platform: String,
    }

    #[test]
    fn test_parse_args_reports_tool_name() {
        let err = parse_args::<Sample>("watch_deployment", json!({})).unwrap_err();
        match err {
            DeployError::InvalidInput(message) => {
                assert!(message.starts_with("Invalid arguments for watch_deployment"));
                assert!(message.contains("platform"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_null_arguments_are_empty_object() {
        assert!(parse_args::<Sample>("x", Value::Null).is_err());
        assert!(parse_args::<Sample>("x", json!({"platform": "vercel"})).is_ok());
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("project", "  ").is_err());
        assert!(require("project", "web").is_ok());
    }
}
