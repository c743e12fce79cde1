//! `compare_deployments`

use deploywatch_common::resilience::Clock;
use deploywatch_domain::constants::DEFAULT_COMPARISON_COUNT;
use deploywatch_domain::{DeploymentComparison, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{require, to_data};
use crate::context::ToolHandler;

const NOT_ENOUGH_DEPLOYMENTS: &str = "Not enough deployments to compare";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareArgs {
    pub platform: String,
    pub project: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Deployments to fetch; at least two are always requested
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    DEFAULT_COMPARISON_COUNT
}

#[derive(Debug, Serialize)]
struct CompareResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<DeploymentComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

pub async fn compare_deployments<C>(handler: &ToolHandler<C>, args: CompareArgs) -> Result<Value>
where
    C: Clock + Clone,
{
    require("project", &args.project)?;
    let intelligence = handler.intelligence(&args.platform)?;

    let comparison = intelligence
        .compare_deployments(&args.project, args.token.as_deref(), args.count)
        .await?;
    let message = comparison.is_none().then_some(NOT_ENOUGH_DEPLOYMENTS);

    to_data(&CompareResult { comparison, message })
}
