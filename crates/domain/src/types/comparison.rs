//! Side-by-side comparison of two deployments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deployment::{CommitInfo, DeploymentOutcome};
use crate::constants::{HIGH_RISK_PERCENT, MEDIUM_RISK_PERCENT};

/// How risky a build-time swing looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// HIGH above 50%, MEDIUM above 20%, LOW otherwise (either direction)
    pub fn from_percentage(percentage: i64) -> Self {
        let magnitude = percentage.saturating_abs();
        if magnitude > HIGH_RISK_PERCENT {
            Self::High
        } else if magnitude > MEDIUM_RISK_PERCENT {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSnapshot {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
    /// Build time in seconds, 0 when unknown
    pub build_time: i64,
    pub status: DeploymentOutcome,
    pub time_ago: String,
}

/// Build time change between two deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTimeDelta {
    pub current: i64,
    pub previous: i64,
    pub delta: i64,
    pub percentage: i64,
}

impl BuildTimeDelta {
    /// `percentage` is `round(delta / previous * 100)`, 0 without a baseline
    pub fn between(current: i64, previous: i64) -> Self {
        let delta = current - previous;
        let percentage = if previous > 0 {
            (delta as f64 / previous as f64 * 100.0).round() as i64
        } else {
            0
        };
        Self { current, previous, delta, percentage }
    }

    /// One-line summary used in watch events
    pub fn summary(&self) -> String {
        match self.delta {
            0 => format!("Build time: {}s (same as previous)", self.current),
            d if d < 0 => {
                format!("Build time: {}s ({}s faster than previous)", self.current, d.abs())
            }
            d => format!("Build time: {}s ({}s slower than previous)", self.current, d),
        }
    }
}

/// Result of comparing the latest deployment with the one before it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentComparison {
    pub current: DeploymentSnapshot,
    pub previous: DeploymentSnapshot,
    pub build_time: BuildTimeDelta,
    pub risk: RiskLevel,
}
