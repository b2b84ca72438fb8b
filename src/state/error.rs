// ABOUTME: State and report file error types with SNAFU context.
// ABOUTME: Carries the path that failed so messages point at the file involved.

use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("failed to create directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to serialize {what}: {source}"))]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },
}
