// ABOUTME: Outcome of a single HTTP health probe.
// ABOUTME: Healthy / unhealthy / error trichotomy with response timing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Classification of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// 2xx response within the deadline.
    Healthy,
    /// The endpoint answered with a non-2xx status.
    Unhealthy,
    /// No answer: connection failure, bad URL, or timeout.
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    pub url: String,
    pub status: HealthStatus,
    /// Milliseconds from request start to classification.
    pub response_time: u64,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl HealthCheckResult {
    pub fn healthy(url: impl Into<String>, elapsed: Duration) -> Self {
        Self::new(url.into(), HealthStatus::Healthy, elapsed, None)
    }

    pub fn unhealthy(url: impl Into<String>, elapsed: Duration, reason: impl Into<String>) -> Self {
        Self::new(
            url.into(),
            HealthStatus::Unhealthy,
            elapsed,
            Some(reason.into()),
        )
    }

    pub fn error(url: impl Into<String>, elapsed: Duration, reason: impl Into<String>) -> Self {
        Self::new(url.into(), HealthStatus::Error, elapsed, Some(reason.into()))
    }

    fn new(url: String, status: HealthStatus, elapsed: Duration, error: Option<String>) -> Self {
        Self {
            url,
            status,
            response_time: elapsed.as_millis().try_into().unwrap_or(u64::MAX),
            timestamp: Utc::now(),
            error,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let result = HealthCheckResult::unhealthy(
            "http://blue/health",
            Duration::from_millis(42),
            "HTTP 503",
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["responseTime"], 42);
        assert_eq!(json["error"], "HTTP 503");
    }

    #[test]
    fn healthy_result_has_no_error() {
        let result = HealthCheckResult::healthy("http://blue/", Duration::ZERO);
        assert!(result.is_healthy());
        assert!(result.error.is_none());
    }
}
