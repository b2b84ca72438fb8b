// ABOUTME: Locations of the persisted state and report files.
// ABOUTME: Relative paths are anchored at the working directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_state")]
    pub state: PathBuf,

    #[serde(default = "default_report")]
    pub report: PathBuf,
}

fn default_state() -> PathBuf {
    PathBuf::from("deployment-state.json")
}

fn default_report() -> PathBuf {
    PathBuf::from("deployment-report.json")
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            state: default_state(),
            report: default_report(),
        }
    }
}

impl FilesConfig {
    pub(crate) fn resolved(self, base: &Path) -> Self {
        let anchor = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        Self {
            state: anchor(self.state),
            report: anchor(self.report),
        }
    }
}
