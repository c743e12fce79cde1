//! Build log filtering and keyword-based failure analysis

use deploywatch_domain::constants::{MSG_LOGS_UNAVAILABLE, MSG_LOGS_UNAVAILABLE_HINT};
use deploywatch_domain::{ErrorAnalysis, FailureKind, LogFilter};
use once_cell::sync::Lazy;
use regex::Regex;

static FILE_LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^\s:]+\.(tsx?|jsx?|js|ts)):(\d+):(\d+)")
        .expect("FILE_LOCATION should compile - this is a bug")
});

static ERROR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)error|fail|exception|critical").expect("ERROR_LINE should compile")
});

static WARNING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)warning|warn|deprecat").expect("WARNING_LINE should compile")
});

/// Keep the lines selected by `filter`
pub fn filter_logs(logs: &str, filter: LogFilter) -> String {
    let pattern = match filter {
        LogFilter::All => return logs.to_string(),
        LogFilter::Error => &*ERROR_LINE,
        LogFilter::Warning => &*WARNING_LINE,
    };

    logs.lines().filter(|line| pattern.is_match(line)).collect::<Vec<_>>().join("\n")
}

/// Categorize a failure from its build logs.
///
/// The first line that names a `file.ts:line:col` location and mentions an
/// error gives the location; the category comes from keywords anywhere in
/// the text, checked in priority order.
pub fn analyze_logs(logs: &str) -> ErrorAnalysis {
    let lower = logs.to_lowercase();

    let mut location = None;
    let mut error_line = None;
    for line in logs.lines() {
        if let Some(caps) = FILE_LOCATION.captures(line) {
            if line.to_lowercase().contains("error") {
                location = Some(format!("{}:{}:{}", &caps[1], &caps[3], &caps[4]));
                error_line = Some(line.trim().to_string());
                break;
            }
        }
    }

    let error_line = error_line
        .or_else(|| {
            logs.lines()
                .find(|line| line.to_lowercase().contains("error"))
                .map(|line| line.trim().to_string())
        })
        .unwrap_or_else(|| "Check logs for details".to_string());

    let (kind, context) = if lower.contains("cannot find module")
        || lower.contains("modulenotfounderror")
    {
        (FailureKind::MissingDependency, Some("Missing package/dependency"))
    } else if lower.contains("environment variable") || lower.contains("env var") {
        (FailureKind::EnvVar, Some("Environment variable issue"))
    } else if lower.contains("timeout") || lower.contains("time limit") {
        (FailureKind::Timeout, Some("Build timeout exceeded"))
    } else if lower.contains("error") || lower.contains("failed") {
        (FailureKind::Build, Some("Build failed"))
    } else {
        (FailureKind::Unknown, None)
    };

    let suggestion = match &location {
        Some(loc) => format!("Error at {loc} - check the file for issues"),
        None => "See full logs below for detailed analysis".to_string(),
    };

    ErrorAnalysis {
        kind,
        message: context.map_or(error_line, str::to_string),
        location,
        suggestion: Some(suggestion),
    }
}

/// Analysis used when the logs of a failed deployment cannot be fetched
pub fn logs_unavailable() -> ErrorAnalysis {
    ErrorAnalysis {
        kind: FailureKind::Unknown,
        message: MSG_LOGS_UNAVAILABLE.to_string(),
        location: None,
        suggestion: Some(MSG_LOGS_UNAVAILABLE_HINT.to_string()),
    }
}
