// ABOUTME: Deployment record persisted in state history and the deployment report.
// ABOUTME: Append-only phase log, final status, and rollback outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::types::{Environment, Version};

/// Lifecycle status of a deployment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentStatus {
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeploymentStatus::InProgress => "in-progress",
            DeploymentStatus::Completed => "completed",
            DeploymentStatus::Failed => "failed",
        })
    }
}

/// The five fixed phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseName {
    PreHealthCheck,
    TargetDeploy,
    WarmupVerification,
    TrafficSwitch,
    PostVerification,
}

impl PhaseName {
    pub const ALL: [PhaseName; 5] = [
        PhaseName::PreHealthCheck,
        PhaseName::TargetDeploy,
        PhaseName::WarmupVerification,
        PhaseName::TrafficSwitch,
        PhaseName::PostVerification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::PreHealthCheck => "pre-health-check",
            PhaseName::TargetDeploy => "target-deploy",
            PhaseName::WarmupVerification => "warmup-verification",
            PhaseName::TrafficSwitch => "traffic-switch",
            PhaseName::PostVerification => "post-verification",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phases are only logged once they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: PhaseName,
    pub status: PhaseStatus,
    pub timestamp: DateTime<Utc>,
    /// Milliseconds spent in the phase.
    pub duration: u64,
}

impl Phase {
    pub fn completed(name: PhaseName, elapsed: Duration) -> Self {
        Self {
            name,
            status: PhaseStatus::Completed,
            timestamp: Utc::now(),
            duration: elapsed.as_millis().try_into().unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackStatus {
    Completed,
    Failed,
}

/// Outcome of an automatic rollback attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackRecord {
    pub status: RollbackStatus,
    pub restored_environment: Environment,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RollbackRecord {
    pub fn completed(restored: Environment) -> Self {
        Self {
            status: RollbackStatus::Completed,
            restored_environment: restored,
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn failed(restored: Environment, error: impl Into<String>) -> Self {
        Self {
            status: RollbackStatus::Failed,
            restored_environment: restored,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// One blue-green deployment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub version: Version,
    pub source_environment: Environment,
    pub target_environment: Environment,
    pub status: DeploymentStatus,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback: Option<RollbackRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Deployment {
    /// Start a record moving traffic away from `source` to its counterpart.
    pub fn start(version: Version, source: Environment, dry_run: bool) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("deploy-{}", timestamp.timestamp_millis()),
            timestamp,
            version,
            source_environment: source,
            target_environment: source.other(),
            status: DeploymentStatus::InProgress,
            phases: Vec::new(),
            dry_run,
            error: None,
            rollback: None,
            warnings: Vec::new(),
        }
    }

    pub fn phase_names(&self) -> Vec<PhaseName> {
        self.phases.iter().map(|p| p.name).collect()
    }

    pub fn is_completed(&self) -> bool {
        self.status == DeploymentStatus::Completed
    }

    /// Total milliseconds spent across logged phases.
    pub fn total_duration(&self) -> u64 {
        self.phases.iter().map(|p| p.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_targets_the_other_environment() {
        let d = Deployment::start(Version::new("v2").unwrap(), Environment::Blue, false);
        assert_eq!(d.target_environment, Environment::Green);
        assert_eq!(d.status, DeploymentStatus::InProgress);
        assert!(d.id.starts_with("deploy-"));
        assert!(d.phases.is_empty());
    }

    #[test]
    fn serialized_shape_matches_report_format() {
        let mut d = Deployment::start(Version::new("v2").unwrap(), Environment::Blue, true);
        d.phases.push(Phase::completed(
            PhaseName::PreHealthCheck,
            Duration::from_millis(15),
        ));

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["sourceEnvironment"], "blue");
        assert_eq!(json["targetEnvironment"], "green");
        assert_eq!(json["status"], "in-progress");
        assert_eq!(json["dryRun"], true);
        assert_eq!(json["phases"][0]["name"], "pre-health-check");
        assert_eq!(json["phases"][0]["status"], "completed");
        assert_eq!(json["phases"][0]["duration"], 15);
        assert!(json.get("error").is_none());
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn phase_names_display_in_kebab_case() {
        let names: Vec<&str> = PhaseName::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            [
                "pre-health-check",
                "target-deploy",
                "warmup-verification",
                "traffic-switch",
                "post-verification"
            ]
        );
    }
}
