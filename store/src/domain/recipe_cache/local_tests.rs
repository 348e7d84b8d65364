//! Local-only cache behaviour against an in-test snapshot store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rstest::rstest;

use super::tests::{FixtureClock, created_at, fixture_now, recipe, session_for, soup_draft};
use super::*;
use crate::domain::{ErrorCode, RecipeDraft};
use crate::domain::ports::{SnapshotKey, SnapshotStoreError};

/// Snapshot store double that can be told to fail writes or to suspend
/// once inside every save.
#[derive(Default)]
struct RecordingStore {
    blobs: Mutex<HashMap<SnapshotKey, String>>,
    fail_writes: Mutex<bool>,
    yield_on_save: AtomicBool,
}

impl RecordingStore {
    fn seeded(recipes: &[Recipe]) -> Self {
        let store = Self::default();
        store.put(&serde_json::to_string(recipes).expect("recipes encode"));
        store
    }

    fn put(&self, blob: &str) {
        self.blobs
            .lock()
            .expect("store lock")
            .insert(SnapshotKey::Recipes, blob.to_owned());
    }

    fn persisted(&self) -> Option<Vec<Recipe>> {
        self.blobs
            .lock()
            .expect("store lock")
            .get(&SnapshotKey::Recipes)
            .map(|blob| serde_json::from_str(blob).expect("persisted recipes decode"))
    }

    fn fail_writes(&self) {
        *self.fail_writes.lock().expect("flag lock") = true;
    }

    fn yield_on_save(&self) {
        self.yield_on_save.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotStore for RecordingStore {
    async fn load(&self, key: SnapshotKey) -> Result<Option<String>, SnapshotStoreError> {
        Ok(self.blobs.lock().expect("store lock").get(&key).cloned())
    }

    async fn save(&self, key: SnapshotKey, blob: &str) -> Result<(), SnapshotStoreError> {
        if self.yield_on_save.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        if *self.fail_writes.lock().expect("flag lock") {
            return Err(SnapshotStoreError::io(key.as_str(), "disk full"));
        }
        self.blobs
            .lock()
            .expect("store lock")
            .insert(key, blob.to_owned());
        Ok(())
    }

    async fn remove(&self, key: SnapshotKey) -> Result<(), SnapshotStoreError> {
        self.blobs.lock().expect("store lock").remove(&key);
        Ok(())
    }
}

async fn local_cache(store: &Arc<RecordingStore>) -> RecipeCache {
    let shared: Arc<dyn SnapshotStore> = store.clone();
    RecipeCache::local_only(shared, Arc::new(FixtureClock)).await
}

fn seeded() -> Vec<Recipe> {
    vec![recipe(1, "u1", false), recipe(5, "u2", false)]
}

#[rstest]
#[tokio::test]
async fn construction_hydrates_from_the_snapshot() {
    let store = Arc::new(RecordingStore::seeded(&seeded()));

    let cache = local_cache(&store).await;

    assert!(cache.is_local_only());
    assert_eq!(cache.recipes(), seeded());
    assert!(cache.last_error().is_none());
    assert!(!cache.is_loading());
}

#[rstest]
#[tokio::test]
async fn malformed_snapshot_is_discarded() {
    let store = Arc::new(RecordingStore::default());
    store.put("[{\"id\": ");

    let cache = local_cache(&store).await;

    assert!(cache.is_empty());
    assert!(cache.last_error().is_none());
    assert!(store.persisted().is_none(), "malformed snapshot is removed");
}

#[rstest]
#[tokio::test]
async fn create_assigns_local_identity_and_persists() {
    let store = Arc::new(RecordingStore::default());
    let cache = local_cache(&store).await;
    let session = session_for("u1");

    let id = cache
        .create(&session, soup_draft())
        .await
        .expect("local create succeeds");

    let created = cache.get_by_id(&id).expect("created recipe is cached");
    assert_eq!(created.owner_id.as_ref(), "u1");
    assert!(!created.is_favorite);
    assert_eq!(created.created_at, fixture_now());
    assert_eq!(created.updated_at, fixture_now());
    assert_eq!(store.persisted(), Some(vec![created]));
}

#[rstest]
#[tokio::test]
async fn failed_write_leaves_the_set_unchanged() {
    let store = Arc::new(RecordingStore::seeded(&seeded()));
    let cache = local_cache(&store).await;
    store.fail_writes();

    let err = cache
        .create(&session_for("u1"), soup_draft())
        .await
        .expect_err("write failure surfaces");

    assert_eq!(err.code(), ErrorCode::StorageFailure);
    assert_eq!(cache.recipes(), seeded());
    assert_eq!(store.persisted(), Some(seeded()));
}

#[rstest]
#[tokio::test]
async fn update_writes_through_and_replaces_in_place() {
    let store = Arc::new(RecordingStore::seeded(&seeded()));
    let cache = local_cache(&store).await;
    let draft = RecipeDraft {
        title: "Broth".to_owned(),
        ..soup_draft()
    };

    let updated = cache
        .update(&session_for("u1"), &RecipeId::from(1_u32), draft)
        .await
        .expect("local update succeeds");

    assert_eq!(updated.title, "Broth");
    assert_eq!(updated.created_at, created_at());
    assert_eq!(updated.updated_at, fixture_now());
    assert_eq!(cache.recipes().first(), Some(&updated));
    assert_eq!(store.persisted(), Some(cache.recipes()));
}

#[rstest]
#[tokio::test]
async fn toggle_persists_without_touching_updated_at() {
    let store = Arc::new(RecordingStore::seeded(&seeded()));
    let cache = local_cache(&store).await;

    let toggled = cache
        .toggle_favorite(&session_for("u1"), &RecipeId::from(1_u32))
        .await
        .expect("local toggle succeeds");

    assert!(toggled.is_favorite);
    assert_eq!(toggled.updated_at, created_at());
    assert_eq!(store.persisted(), Some(cache.recipes()));
}

#[rstest]
#[tokio::test]
async fn delete_persists_the_remaining_records() {
    let store = Arc::new(RecordingStore::seeded(&seeded()));
    let cache = local_cache(&store).await;

    cache
        .delete(&session_for("u1"), &RecipeId::from(1_u32))
        .await
        .expect("local delete succeeds");

    assert!(cache.get_by_id(&RecipeId::from(1_u32)).is_none());
    assert_eq!(store.persisted(), Some(vec![recipe(5, "u2", false)]));
}

#[rstest]
#[tokio::test]
async fn foreign_mutations_never_reach_the_store() {
    let store = Arc::new(RecordingStore::seeded(&seeded()));
    let cache = local_cache(&store).await;
    store.fail_writes();

    let err = cache
        .delete(&session_for("u1"), &RecipeId::from(5_u32))
        .await
        .expect_err("foreign delete fails");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(cache.recipes(), seeded());
}

#[rstest]
#[tokio::test]
async fn overlapping_creates_keep_the_snapshot_in_step() {
    let store = Arc::new(RecordingStore::default());
    let cache = local_cache(&store).await;
    store.yield_on_save();
    let session = session_for("u1");

    let (first, second) = tokio::join!(
        cache.create(&session, soup_draft()),
        cache.create(&session, soup_draft()),
    );
    first.expect("first create succeeds");
    second.expect("second create succeeds");

    assert_eq!(cache.len(), 2);
    assert_eq!(store.persisted(), Some(cache.recipes()));
}

#[rstest]
#[tokio::test]
async fn overlapping_mixed_mutations_keep_the_snapshot_in_step() {
    let store = Arc::new(RecordingStore::seeded(&seeded()));
    let cache = local_cache(&store).await;
    store.yield_on_save();
    let session = session_for("u1");
    let id = RecipeId::from(1_u32);

    let (created, toggled) = tokio::join!(
        cache.create(&session, soup_draft()),
        cache.toggle_favorite(&session, &id),
    );
    created.expect("create succeeds");
    toggled.expect("toggle succeeds");

    assert_eq!(cache.len(), 3);
    assert!(cache.get_by_id(&id).is_some_and(|recipe| recipe.is_favorite));
    assert_eq!(store.persisted(), Some(cache.recipes()));
}
