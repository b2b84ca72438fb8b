// ABOUTME: Diagnostics accumulator for non-fatal warnings during deployment.
// ABOUTME: Collects warnings that shouldn't fail a deployment but should be shown to users.

/// Collects non-fatal warnings during deployment operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a post-deployment verification warning.
    pub fn post_verification(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PostVerification,
            message: message.into(),
        }
    }

    /// Create a report write warning.
    pub fn report_write(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ReportWrite,
            message: message.into(),
        }
    }

    /// Create a state write warning.
    pub fn state_write(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StateWrite,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Production alias missed the health threshold after the switch.
    PostVerification,
    /// deployment-report.json could not be written.
    ReportWrite,
    /// State could not be persisted after the deployment outcome was known.
    StateWrite,
}
