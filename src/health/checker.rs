// ABOUTME: Aggregates endpoint probes into an environment verdict.
// ABOUTME: Retries up to the configured budget; the first attempt clearing the threshold wins.

use futures::future::join_all;
use serde::Serialize;
use std::fmt;

use crate::config::HealthConfig;
use crate::types::Environment;

use super::prober::HealthProber;
use super::result::HealthCheckResult;

/// What is being checked: one of the two environments or the production alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckTarget {
    Blue,
    Green,
    Production,
}

impl From<Environment> for CheckTarget {
    fn from(environment: Environment) -> Self {
        match environment {
            Environment::Blue => CheckTarget::Blue,
            Environment::Green => CheckTarget::Green,
        }
    }
}

impl fmt::Display for CheckTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckTarget::Blue => "blue",
            CheckTarget::Green => "green",
            CheckTarget::Production => "production",
        })
    }
}

/// Verdict for one environment, carrying the probes of the last attempt made.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentHealth {
    pub target: CheckTarget,
    pub url: String,
    pub healthy: bool,
    pub healthy_count: usize,
    pub total: usize,
    pub healthy_ratio: f64,
    pub attempts: u32,
    pub results: Vec<HealthCheckResult>,
}

fn ratio(healthy: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        healthy as f64 / total as f64
    }
}

/// Whether `healthy` out of `total` clears `threshold`.
pub fn meets_threshold(healthy: usize, total: usize, threshold: f64) -> bool {
    if total == 0 {
        return false;
    }
    // Tolerate float noise so that 4/5 clears a 0.8 threshold
    healthy as f64 + 1e-9 >= threshold * total as f64
}

/// Probe every configured endpoint of `url`, retrying until the threshold is
/// met or the attempt budget is spent.
///
/// Endpoints within an attempt are probed concurrently; attempts are
/// separated by `config.interval`.
pub async fn check_environment<P>(
    prober: &P,
    target: CheckTarget,
    url: &str,
    config: &HealthConfig,
) -> EnvironmentHealth
where
    P: HealthProber + ?Sized,
{
    let max_attempts = config.attempts.max(1);
    let mut attempt = 1;

    loop {
        let results = join_all(
            config
                .endpoints
                .iter()
                .map(|endpoint| prober.probe(url, endpoint)),
        )
        .await;

        let total = results.len();
        let healthy_count = results.iter().filter(|r| r.is_healthy()).count();
        let healthy = meets_threshold(healthy_count, total, config.threshold);

        tracing::debug!(
            %target,
            attempt,
            healthy_count,
            total,
            "health check attempt finished"
        );

        if healthy || attempt >= max_attempts {
            if healthy {
                tracing::info!(%target, attempt, "{} is healthy ({}/{})", target, healthy_count, total);
            } else {
                tracing::warn!(
                    %target,
                    "{} is unhealthy after {} attempt(s) ({}/{} endpoints healthy)",
                    target,
                    attempt,
                    healthy_count,
                    total
                );
            }
            return EnvironmentHealth {
                target,
                url: url.to_string(),
                healthy,
                healthy_count,
                total,
                healthy_ratio: ratio(healthy_count, total),
                attempts: attempt,
                results,
            };
        }

        tracing::warn!(
            %target,
            "attempt {}/{} below threshold ({}/{} healthy), retrying in {:?}",
            attempt,
            max_attempts,
            healthy_count,
            total,
            config.interval
        );
        tokio::time::sleep(config.interval).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nonempty::NonEmpty;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Fails every endpoint whose name is in `failing` until `recover_after`
    /// attempts have been made.
    struct FlakyProber {
        failing: Vec<&'static str>,
        recover_after: usize,
        calls: Mutex<usize>,
        endpoints: usize,
    }

    #[async_trait]
    impl HealthProber for FlakyProber {
        async fn probe(&self, base_url: &str, endpoint: &str) -> HealthCheckResult {
            let attempt = {
                let mut calls = self.calls.lock();
                *calls += 1;
                (*calls - 1) / self.endpoints
            };
            let url = format!("{base_url}{endpoint}");
            if attempt < self.recover_after && self.failing.iter().any(|f| *f == endpoint) {
                HealthCheckResult::error(url, Duration::ZERO, "connection refused")
            } else {
                HealthCheckResult::healthy(url, Duration::ZERO)
            }
        }
    }

    fn config(endpoints: &[&str], threshold: f64) -> HealthConfig {
        let endpoints: Vec<String> = endpoints.iter().map(|e| e.to_string()).collect();
        HealthConfig {
            endpoints: NonEmpty::from_vec(endpoints).unwrap(),
            attempts: 3,
            interval: Duration::ZERO,
            timeout: Duration::from_secs(1),
            threshold,
        }
    }

    #[test]
    fn threshold_boundaries() {
        assert!(meets_threshold(4, 5, 0.8));
        assert!(!meets_threshold(3, 5, 0.8));
        assert!(meets_threshold(3, 3, 1.0));
        assert!(!meets_threshold(0, 0, 0.5));
    }

    #[tokio::test]
    async fn healthy_on_first_attempt() {
        let prober = FlakyProber {
            failing: vec![],
            recover_after: 0,
            calls: Mutex::new(0),
            endpoints: 3,
        };
        let health = check_environment(
            &prober,
            CheckTarget::Blue,
            "http://blue",
            &config(&["/", "/a", "/b"], 0.8),
        )
        .await;

        assert!(health.healthy);
        assert_eq!(health.attempts, 1);
        assert_eq!(health.healthy_count, 3);
    }

    #[tokio::test]
    async fn recovers_within_retry_budget() {
        let prober = FlakyProber {
            failing: vec!["/a", "/b"],
            recover_after: 2,
            calls: Mutex::new(0),
            endpoints: 3,
        };
        let health = check_environment(
            &prober,
            CheckTarget::Green,
            "http://green",
            &config(&["/", "/a", "/b"], 0.8),
        )
        .await;

        assert!(health.healthy);
        assert_eq!(health.attempts, 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let prober = FlakyProber {
            failing: vec!["/a"],
            recover_after: usize::MAX,
            calls: Mutex::new(0),
            endpoints: 2,
        };
        let health = check_environment(
            &prober,
            CheckTarget::Production,
            "http://prod",
            &config(&["/", "/a"], 0.8),
        )
        .await;

        assert!(!health.healthy);
        assert_eq!(health.attempts, 3);
        assert_eq!(health.healthy_count, 1);
        assert_eq!(*prober.calls.lock(), 6);
        assert!((health.healthy_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn partial_health_above_threshold_passes() {
        let prober = FlakyProber {
            failing: vec!["/e"],
            recover_after: usize::MAX,
            calls: Mutex::new(0),
            endpoints: 5,
        };
        let health = check_environment(
            &prober,
            CheckTarget::Blue,
            "http://blue",
            &config(&["/a", "/b", "/c", "/d", "/e"], 0.8),
        )
        .await;

        assert!(health.healthy);
        assert_eq!(health.healthy_count, 4);
    }
}
