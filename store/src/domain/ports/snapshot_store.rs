//! Driven port for the persistent key-value snapshot store.
//!
//! Session identity and, in local-only mode, the recipe collection survive
//! restarts as JSON blobs under fixed keys. Adapters only move opaque text;
//! encoding and decoding stay in the domain services.

use std::fmt;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::define_port_error;

/// Fixed keys used by the persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKey {
    /// The signed-in user, or absent when anonymous.
    Session,
    /// The full recipe collection in local-only mode.
    Recipes,
}

impl SnapshotKey {
    /// Stable storage name for the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Session => "recipe-store.session",
            Self::Recipes => "recipe-store.recipes",
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

define_port_error! {
    /// Errors raised by snapshot store adapters.
    pub enum SnapshotStoreError {
        /// The underlying medium failed to read or write.
        Io { key: String, message: String } =>
            "snapshot store failed for {key}: {message}",
    }
}

impl From<SnapshotStoreError> for DomainError {
    fn from(value: SnapshotStoreError) -> Self {
        Self::storage_failure(value.to_string())
    }
}

/// Port for reading and writing persisted snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the blob under `key`, or `None` when nothing is stored.
    async fn load(&self, key: SnapshotKey) -> Result<Option<String>, SnapshotStoreError>;

    /// Replace the blob under `key`.
    async fn save(&self, key: SnapshotKey, blob: &str) -> Result<(), SnapshotStoreError>;

    /// Delete the blob under `key`; removing a missing key succeeds.
    async fn remove(&self, key: SnapshotKey) -> Result<(), SnapshotStoreError>;
}

/// Fixture store that never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSnapshotStore;

#[async_trait]
impl SnapshotStore for FixtureSnapshotStore {
    async fn load(&self, _key: SnapshotKey) -> Result<Option<String>, SnapshotStoreError> {
        Ok(None)
    }

    async fn save(&self, _key: SnapshotKey, _blob: &str) -> Result<(), SnapshotStoreError> {
        Ok(())
    }

    async fn remove(&self, _key: SnapshotKey) -> Result<(), SnapshotStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SnapshotKey::Session, "recipe-store.session")]
    #[case(SnapshotKey::Recipes, "recipe-store.recipes")]
    fn keys_have_stable_names(#[case] key: SnapshotKey, #[case] expected: &str) {
        assert_eq!(key.as_str(), expected);
        assert_eq!(key.to_string(), expected);
    }

    #[rstest]
    fn io_failures_map_to_storage_failure() {
        let err = DomainError::from(SnapshotStoreError::io("recipe-store.recipes", "disk full"));
        assert_eq!(err.code(), crate::domain::ErrorCode::StorageFailure);
        assert_eq!(
            err.message(),
            "snapshot store failed for recipe-store.recipes: disk full"
        );
    }

    #[tokio::test]
    async fn fixture_store_forgets_everything() {
        let store = FixtureSnapshotStore;
        store
            .save(SnapshotKey::Recipes, "[]")
            .await
            .expect("fixture save succeeds");
        let loaded = store
            .load(SnapshotKey::Recipes)
            .await
            .expect("fixture load succeeds");
        assert!(loaded.is_none());
    }
}
