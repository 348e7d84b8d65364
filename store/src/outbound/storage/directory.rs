//! Directory-backed snapshot store.
//!
//! Each key maps to `<key>.json` inside one directory opened through
//! `cap_std`, so the adapter cannot reach outside it. Writes land in a
//! uniquely named temporary file that is then renamed over the target.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tokio::task;
use uuid::Uuid;

use crate::domain::ports::{SnapshotKey, SnapshotStore, SnapshotStoreError};

/// Snapshot store writing JSON files into a single directory.
#[derive(Clone)]
pub struct DirectorySnapshotStore {
    dir: Arc<Dir>,
    root: PathBuf,
}

impl DirectorySnapshotStore {
    /// Open `root`, creating it (and any parents) when missing.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SnapshotStoreError> {
        let root_path = root.as_ref().to_path_buf();
        let io_error = |error: io::Error| {
            SnapshotStoreError::io(root_path.display().to_string(), error.to_string())
        };
        Dir::create_ambient_dir_all(&root_path, ambient_authority()).map_err(io_error)?;
        let dir = Dir::open_ambient_dir(&root_path, ambient_authority()).map_err(io_error)?;
        Ok(Self {
            dir: Arc::new(dir),
            root: root_path,
        })
    }

    /// Directory the snapshots live in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn run<T, F>(&self, key: SnapshotKey, op: F) -> Result<T, SnapshotStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &Path) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        task::spawn_blocking(move || op(&*dir, file_name(key).as_path()))
            .await
            .map_err(|error| SnapshotStoreError::io(key.as_str(), error.to_string()))?
            .map_err(|error| SnapshotStoreError::io(key.as_str(), error.to_string()))
    }
}

fn file_name(key: SnapshotKey) -> PathBuf {
    PathBuf::from(format!("{}.json", key.as_str()))
}

#[async_trait]
impl SnapshotStore for DirectorySnapshotStore {
    async fn load(&self, key: SnapshotKey) -> Result<Option<String>, SnapshotStoreError> {
        self.run(key, |dir, path| match dir.read_to_string(path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        })
        .await
    }

    async fn save(&self, key: SnapshotKey, blob: &str) -> Result<(), SnapshotStoreError> {
        let contents = blob.to_owned();
        self.run(key, move |dir, path| {
            let staged =
                PathBuf::from(format!(".tmp-{}-{}", key.as_str(), Uuid::new_v4().simple()));
            if let Err(error) = dir.write(&staged, contents.as_bytes()) {
                let _cleanup_result = dir.remove_file(&staged);
                return Err(error);
            }
            dir.rename(&staged, dir, path).inspect_err(|_| {
                let _cleanup_result = dir.remove_file(&staged);
            })
        })
        .await
    }

    async fn remove(&self, key: SnapshotKey) -> Result<(), SnapshotStoreError> {
        self.run(key, |dir, path| match dir.remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Filesystem coverage using temporary directories.

    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    #[rstest]
    #[tokio::test]
    async fn missing_keys_load_as_none(temp_dir: TempDir) {
        let store = DirectorySnapshotStore::open(temp_dir.path()).expect("store opens");
        let loaded = store.load(SnapshotKey::Session).await.expect("load succeeds");
        assert!(loaded.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn saved_blobs_are_read_back_and_replaced(temp_dir: TempDir) {
        let store = DirectorySnapshotStore::open(temp_dir.path()).expect("store opens");

        store.save(SnapshotKey::Recipes, "[]").await.expect("first save");
        store
            .save(SnapshotKey::Recipes, "[1]")
            .await
            .expect("second save");

        let loaded = store.load(SnapshotKey::Recipes).await.expect("load succeeds");
        assert_eq!(loaded.as_deref(), Some("[1]"));
        assert!(temp_dir.path().join("recipe-store.recipes.json").is_file());
    }

    #[rstest]
    #[tokio::test]
    async fn saves_leave_no_temporary_files(temp_dir: TempDir) {
        let store = DirectorySnapshotStore::open(temp_dir.path()).expect("store opens");
        store.save(SnapshotKey::Session, "{}").await.expect("save");

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .expect("dir lists")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["recipe-store.session.json"]);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_is_idempotent(temp_dir: TempDir) {
        let store = DirectorySnapshotStore::open(temp_dir.path()).expect("store opens");
        store.save(SnapshotKey::Session, "{}").await.expect("save");

        store.remove(SnapshotKey::Session).await.expect("first remove");
        store.remove(SnapshotKey::Session).await.expect("second remove");

        let loaded = store.load(SnapshotKey::Session).await.expect("load succeeds");
        assert!(loaded.is_none());
    }

    #[rstest]
    fn open_creates_nested_directories(temp_dir: TempDir) {
        let nested = temp_dir.path().join("a").join("b");
        let store = DirectorySnapshotStore::open(&nested).expect("store opens");
        assert!(nested.is_dir());
        assert_eq!(store.root(), nested.as_path());
    }
}
