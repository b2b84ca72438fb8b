// ABOUTME: JSON file implementation of StateStore.
// ABOUTME: Missing or unparsable files load as the default state.

use async_trait::async_trait;
use snafu::ResultExt;
use std::path::{Path, PathBuf};

use super::error::{CreateDirSnafu, SerializeSnafu, StoreError, WriteSnafu};
use super::{DeploymentState, StateStore};

#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> DeploymentState {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, using defaults", self.path.display());
                return DeploymentState::default();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read state file {}: {}; using defaults",
                    self.path.display(),
                    e
                );
                return DeploymentState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    "State file {} is not valid ({}); using defaults",
                    self.path.display(),
                    e
                );
                DeploymentState::default()
            }
        }
    }

    async fn save(&self, state: &DeploymentState) -> Result<(), StoreError> {
        write_json(&self.path, state, "deployment state").await
    }
}

/// Pretty-print `value` to `path`, creating parent directories.
pub(crate) async fn write_json<T: serde::Serialize + Sync>(
    path: &Path,
    value: &T,
    what: &'static str,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .context(CreateDirSnafu { path: parent })?;
    }

    let mut json = serde_json::to_string_pretty(value).context(SerializeSnafu { what })?;
    json.push('\n');

    tokio::fs::write(path, json)
        .await
        .context(WriteSnafu { path })?;

    tracing::debug!("Wrote {} to {}", what, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Environment;

    #[tokio::test]
    async fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));

        assert_eq!(store.load().await, DeploymentState::default());
    }

    #[tokio::test]
    async fn corrupt_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStateStore::new(&path);
        assert_eq!(store.load().await, DeploymentState::default());
    }

    #[tokio::test]
    async fn save_then_load_preserves_environment() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("nested/state.json"));

        let state = DeploymentState {
            current_environment: Environment::Green,
            ..Default::default()
        };
        store.save(&state).await.unwrap();

        assert_eq!(store.load().await.current_environment, Environment::Green);
    }

    #[tokio::test]
    async fn reads_camel_case_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"currentEnvironment":"green","lastDeployment":null,"deploymentHistory":[]}"#,
        )
        .unwrap();

        let store = FileStateStore::new(&path);
        assert_eq!(store.load().await.current_environment, Environment::Green);
    }
}
