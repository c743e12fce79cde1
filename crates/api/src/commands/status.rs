//! `check_deployment_status`

use deploywatch_common::resilience::Clock;
use deploywatch_domain::constants::DEFAULT_STATUS_LIMIT;
use deploywatch_domain::Result;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{require, to_data};
use crate::context::ToolHandler;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusArgs {
    pub platform: String,
    pub project: String,
    #[serde(default)]
    pub token: Option<String>,
    /// How many recent deployments to report; 1 returns a single status
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_STATUS_LIMIT
}

/// Latest status, or `{count, deployments}` when more than one is asked for
pub async fn check_deployment_status<C>(handler: &ToolHandler<C>, args: StatusArgs) -> Result<Value>
where
    C: Clock + Clone,
{
    require("project", &args.project)?;
    let intelligence = handler.intelligence(&args.platform)?;

    if args.limit <= 1 {
        let status = intelligence.latest_status(&args.project, args.token.as_deref()).await?;
        return to_data(&status);
    }

    let statuses =
        intelligence.recent_statuses(&args.project, args.token.as_deref(), args.limit).await?;
    Ok(json!({ "count": statuses.len(), "deployments": statuses }))
}
