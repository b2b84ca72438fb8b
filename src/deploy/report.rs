// ABOUTME: Writes the latest deployment record to deployment-report.json.
// ABOUTME: Overwritten on every run, including failed and dry runs.

use std::path::{Path, PathBuf};

use crate::state::{StoreError, write_json};

use super::Deployment;

#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, deployment: &Deployment) -> Result<(), StoreError> {
        write_json(&self.path, deployment, "deployment report").await
    }

    /// Read the last report back, if one exists and parses.
    pub async fn read(&self) -> Option<Deployment> {
        let content = tokio::fs::read_to_string(&self.path).await.ok()?;
        serde_json::from_str(&content).ok()
    }
}
