//! Deployment-to-deployment comparison

use chrono::{DateTime, Utc};
use deploywatch_domain::{
    BuildTimeDelta, DeploymentComparison, DeploymentRecord, DeploymentSnapshot, Result, RiskLevel,
};

use crate::platform::ports::PlatformAdapter;

/// Compare `current` against `previous` as seen at `now`
pub fn compare_records(
    current: &DeploymentRecord,
    previous: &DeploymentRecord,
    now: DateTime<Utc>,
) -> DeploymentComparison {
    let current_snapshot = snapshot(current, now);
    let previous_snapshot = snapshot(previous, now);
    let build_time = BuildTimeDelta::between(current_snapshot.build_time, previous_snapshot.build_time);

    DeploymentComparison {
        current: current_snapshot,
        previous: previous_snapshot,
        risk: RiskLevel::from_percentage(build_time.percentage),
        build_time,
    }
}

fn snapshot(record: &DeploymentRecord, now: DateTime<Utc>) -> DeploymentSnapshot {
    DeploymentSnapshot {
        id: record.id.clone(),
        url: record.url.clone(),
        timestamp: record.created_at,
        commit: record.commit.clone(),
        build_time: record.build_duration_secs().unwrap_or(0),
        status: record.state.outcome(),
        time_ago: record.created_at.map_or_else(|| "unknown".to_string(), |ts| time_ago(ts, now)),
    }
}

/// "3 minutes ago" style age, using the largest whole unit
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let (value, unit) = if days > 0 {
        (days, "day")
    } else if hours > 0 {
        (hours, "hour")
    } else if minutes > 0 {
        (minutes, "minute")
    } else {
        (seconds, "second")
    };

    let plural = if value == 1 { "" } else { "s" };
    format!("{value} {unit}{plural} ago")
}

/// Fetch the latest `count` deployments and compare the current one with
/// the one before it.
///
/// `current_id` pins the "current" side; otherwise the newest deployment is
/// used. Returns `None` when the project has fewer than two deployments.
pub async fn compare_recent(
    adapter: &dyn PlatformAdapter,
    project: &str,
    credential: &str,
    current_id: Option<&str>,
    count: usize,
) -> Result<Option<DeploymentComparison>> {
    let deployments = adapter.recent_deployments(project, credential, count.max(2)).await?;
    if deployments.len() < 2 {
        return Ok(None);
    }

    let current = current_id
        .and_then(|id| deployments.iter().find(|d| d.id == id))
        .unwrap_or(&deployments[0]);
    let Some(previous) = deployments.iter().find(|d| d.id != current.id) else {
        return Ok(None);
    };

    Ok(Some(compare_records(current, previous, Utc::now())))
}
