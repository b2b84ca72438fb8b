// ABOUTME: Deploy lock to prevent concurrent invocations racing on the state file.
// ABOUTME: Uses atomic file creation next to the state file; released on drop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::DeployError;

/// Locks older than this are considered abandoned.
const STALE_AFTER_HOURS: i64 = 1;

/// Unreadable locks younger than this are assumed to belong to a live holder.
const UNREADABLE_GRACE: Duration = Duration::from_secs(10);

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Information about who holds a deploy lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new() -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= STALE_AFTER_HOURS
    }

    /// Path to the lock file guarding `state_file`.
    pub fn lock_path(state_file: &Path) -> PathBuf {
        let mut name = state_file.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }
}

impl Default for LockInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// What was found at the lock path when acquisition failed.
#[derive(Debug)]
enum ExistingLock {
    Info(LockInfo),
    /// Contents could not be parsed; carries the age of the file.
    Unreadable(Duration),
}

/// A held deploy lock that releases on drop.
#[derive(Debug)]
pub struct DeployLock {
    path: PathBuf,
}

impl DeployLock {
    /// Acquire the deploy lock guarding `state_file`.
    ///
    /// The lock info is written to a staging file and hard-linked into
    /// place, so the lock path never holds partial contents.
    /// Returns error if the lock is already held by another process.
    /// Auto-breaks stale (>1 hour) locks, and unreadable ones older than a
    /// few seconds, with a warning; `force` breaks any lock.
    pub async fn acquire(state_file: &Path, force: bool) -> Result<Self, DeployError> {
        let path = LockInfo::lock_path(state_file);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DeployError::lock_error(format!("failed to create lock directory: {e}"))
            })?;
        }

        let lock_json = serde_json::to_string(&LockInfo::new())
            .map_err(|e| DeployError::lock_error(format!("failed to serialize lock: {e}")))?;

        if Self::try_create(&path, &lock_json).await? {
            return Ok(Self { path });
        }

        // Lock acquisition failed - check if existing lock should be broken
        let existing = Self::read_existing(&path).await;
        if !Self::should_break(&existing, force) {
            return Err(match existing {
                ExistingLock::Info(info) => {
                    DeployError::lock_held(info.holder, info.pid, info.started_at)
                }
                ExistingLock::Unreadable(_) => {
                    DeployError::lock_error("lock held by another process")
                }
            });
        }

        // Break the lock and retry
        tracing::debug!("Removing stale/forced lock at {}", path.display());
        let _ = tokio::fs::remove_file(&path).await;

        if Self::try_create(&path, &lock_json).await? {
            Ok(Self { path })
        } else {
            Err(DeployError::lock_error(
                "lock acquired by another process during break",
            ))
        }
    }

    /// Atomically publish the lock file. Returns false if it already exists.
    async fn try_create(path: &Path, contents: &str) -> Result<bool, DeployError> {
        let staging = Self::staging_path(path);
        tokio::fs::write(&staging, contents)
            .await
            .map_err(|e| DeployError::lock_error(format!("failed to write lock: {e}")))?;

        let linked = tokio::fs::hard_link(&staging, path).await;
        if let Err(e) = tokio::fs::remove_file(&staging).await {
            tracing::debug!("Failed to remove {}: {}", staging.display(), e);
        }

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(DeployError::lock_error(format!(
                "failed to create lock file {}: {e}",
                path.display()
            ))),
        }
    }

    fn staging_path(path: &Path) -> PathBuf {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut name = path.as_os_str().to_owned();
        name.push(format!(".{}.{seq}.tmp", std::process::id()));
        PathBuf::from(name)
    }

    async fn read_existing(path: &Path) -> ExistingLock {
        if let Ok(content) = tokio::fs::read_to_string(path).await
            && let Ok(info) = serde_json::from_str(&content)
        {
            return ExistingLock::Info(info);
        }

        // A vanished file has no age to respect
        let age = tokio::fs::metadata(path)
            .await
            .and_then(|meta| meta.modified())
            .map(|modified| modified.elapsed().unwrap_or(Duration::ZERO))
            .unwrap_or(Duration::MAX);
        ExistingLock::Unreadable(age)
    }

    /// Decide whether an existing lock should be broken (stale, forced, or
    /// unreadable past the grace period).
    fn should_break(existing: &ExistingLock, force: bool) -> bool {
        match existing {
            ExistingLock::Info(lock) if force => {
                tracing::warn!(
                    "Breaking lock held by {} (pid {}) since {}",
                    lock.holder,
                    lock.pid,
                    lock.started_at
                );
                true
            }
            ExistingLock::Info(lock) if lock.is_stale() => {
                tracing::warn!(
                    "Auto-breaking stale lock held by {} (pid {}) since {}",
                    lock.holder,
                    lock.pid,
                    lock.started_at
                );
                true
            }
            ExistingLock::Info(_) => false,
            ExistingLock::Unreadable(_) if force => {
                tracing::warn!("Breaking unreadable lock");
                true
            }
            ExistingLock::Unreadable(age) if *age >= UNREADABLE_GRACE => {
                tracing::warn!("Lock info unreadable for {}s, breaking lock", age.as_secs());
                true
            }
            ExistingLock::Unreadable(_) => false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}
