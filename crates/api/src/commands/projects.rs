//! `list_projects`

use deploywatch_common::resilience::Clock;
use deploywatch_domain::constants::DEFAULT_PROJECT_LIMIT;
use deploywatch_domain::{ProjectSummary, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::to_data;
use crate::context::ToolHandler;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsArgs {
    pub platform: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PROJECT_LIMIT
}

#[derive(Debug, Serialize)]
struct ProjectList<'a> {
    platform: &'a str,
    count: usize,
    projects: Vec<ProjectSummary>,
}

pub async fn list_projects<C>(handler: &ToolHandler<C>, args: ProjectsArgs) -> Result<Value>
where
    C: Clock + Clone,
{
    let intelligence = handler.intelligence(&args.platform)?;
    let projects = intelligence.list_projects(args.token.as_deref(), args.limit).await?;

    to_data(&ProjectList { platform: intelligence.platform(), count: projects.len(), projects })
}
