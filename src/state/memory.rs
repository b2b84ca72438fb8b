// ABOUTME: In-memory StateStore used for dry runs and tests.
// ABOUTME: Seeded from a snapshot; never touches the filesystem.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{DeploymentState, StateStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<DeploymentState>,
    saves: Mutex<usize>,
}

impl MemoryStateStore {
    pub fn new(state: DeploymentState) -> Self {
        Self {
            state: Mutex::new(state),
            saves: Mutex::new(0),
        }
    }

    /// Current contents without going through the trait.
    pub fn snapshot(&self) -> DeploymentState {
        self.state.lock().clone()
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> DeploymentState {
        self.state.lock().clone()
    }

    async fn save(&self, state: &DeploymentState) -> Result<(), StoreError> {
        *self.state.lock() = state.clone();
        *self.saves.lock() += 1;
        Ok(())
    }
}
