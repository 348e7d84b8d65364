//! Process-local snapshot store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{SnapshotKey, SnapshotStore, SnapshotStoreError};

/// Snapshot store that keeps blobs in memory.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    blobs: Mutex<HashMap<SnapshotKey, String>>,
}

impl InMemorySnapshotStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `blob` under `key`.
    #[must_use]
    pub fn with_blob(key: SnapshotKey, blob: impl Into<String>) -> Self {
        let store = Self::default();
        store.lock().insert(key, blob.into());
        store
    }

    /// Current blob under `key`, without going through the async port.
    #[must_use]
    pub fn get(&self, key: SnapshotKey) -> Option<String> {
        self.lock().get(&key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SnapshotKey, String>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, key: SnapshotKey) -> Result<Option<String>, SnapshotStoreError> {
        Ok(self.get(key))
    }

    async fn save(&self, key: SnapshotKey, blob: &str) -> Result<(), SnapshotStoreError> {
        self.lock().insert(key, blob.to_owned());
        Ok(())
    }

    async fn remove(&self, key: SnapshotKey) -> Result<(), SnapshotStoreError> {
        self.lock().remove(&key);
        Ok(())
    }
}
