//! JSON-schema descriptions of the tools for `tools/list`

use serde::Serialize;
use serde_json::{json, Value};

use super::{
    TOOL_CHECK_DEPLOYMENT_STATUS, TOOL_COMPARE_DEPLOYMENTS, TOOL_GET_DEPLOYMENT_LOGS,
    TOOL_LIST_PROJECTS, TOOL_WATCH_DEPLOYMENT,
};

const TOKEN_DESCRIPTION: &str = "API token for authentication (optional if set in environment)";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn schema(platforms: &[&str], properties: Value, required: &[&str]) -> Value {
    let mut all = json!({
        "platform": {
            "type": "string",
            "enum": platforms,
            "description": "The deployment platform"
        },
        "token": { "type": "string", "description": TOKEN_DESCRIPTION }
    });
    if let (Some(all), Value::Object(extra)) = (all.as_object_mut(), properties) {
        all.extend(extra);
    }

    json!({ "type": "object", "properties": all, "required": required })
}

/// Every tool, in a stable order
pub fn tool_descriptors(platforms: &[&str]) -> Vec<ToolDescriptor> {
    let project = json!({ "type": "string", "description": "The project name or ID" });

    vec![
        ToolDescriptor {
            name: TOOL_CHECK_DEPLOYMENT_STATUS,
            description: "Check the latest deployment status for a project on a platform",
            input_schema: schema(
                platforms,
                json!({
                    "project": project,
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "default": 1,
                        "description": "Number of recent deployments to report"
                    }
                }),
                &["platform", "project"],
            ),
        },
        ToolDescriptor {
            name: TOOL_WATCH_DEPLOYMENT,
            description: "Follow a deployment until it finishes, reporting each state change",
            input_schema: schema(
                platforms,
                json!({
                    "project": project,
                    "deploymentId": {
                        "type": "string",
                        "description": "Specific deployment ID to watch (optional, defaults to latest)"
                    }
                }),
                &["platform", "project"],
            ),
        },
        ToolDescriptor {
            name: TOOL_COMPARE_DEPLOYMENTS,
            description: "Compare the latest deployment with the previous one",
            input_schema: schema(
                platforms,
                json!({
                    "project": project,
                    "count": {
                        "type": "integer",
                        "minimum": 2,
                        "default": 2,
                        "description": "Number of recent deployments to fetch"
                    }
                }),
                &["platform", "project"],
            ),
        },
        ToolDescriptor {
            name: TOOL_GET_DEPLOYMENT_LOGS,
            description: "Fetch filtered build logs for a deployment with a failure analysis",
            input_schema: schema(
                platforms,
                json!({
                    "deploymentId": {
                        "type": "string",
                        "description": "The deployment ID or 'latest' for most recent"
                    },
                    "project": {
                        "type": "string",
                        "description": "Project/site name (required when using 'latest' as deploymentId)"
                    },
                    "filter": {
                        "type": "string",
                        "enum": ["error", "warning", "all"],
                        "default": "error",
                        "description": "Filter logs by type (default: error)"
                    }
                }),
                &["platform", "deploymentId"],
            ),
        },
        ToolDescriptor {
            name: TOOL_LIST_PROJECTS,
            description: "List the projects visible to the credential on a platform",
            input_schema: schema(
                platforms,
                json!({
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "default": 20,
                        "description": "Maximum number of projects to return"
                    }
                }),
                &["platform"],
            ),
        },
    ]
}
