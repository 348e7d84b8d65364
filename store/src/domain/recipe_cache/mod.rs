//! Ownership-gated recipe cache.
//!
//! The cache owns the local copy of the recipe collection and mediates every
//! create, update, delete and favourite toggle. Mutations are authorised
//! against an explicit [`SessionContext`] before any I/O, then either sent
//! to the remote collection (whose response is authoritative) or written
//! through to the snapshot store in local-only mode.
//!
//! The record set lives behind a `std` lock that is never held across an
//! `.await`; concurrent mutations of one id resolve last-write-wins. In
//! local-only mode a separate async write gate serialises each
//! copy, persist and commit sequence, so the snapshot always holds the
//! committed set.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mockable::Clock;
use tokio::sync::{Mutex, MutexGuard};

use super::ports::{RecipeSource, SnapshotStore};
use super::status::OperationStatus;
use super::{DomainError, Recipe, RecipeId, SessionContext};

mod ops;

/// Where the cache's source of truth lives.
#[derive(Clone)]
pub enum SyncMode {
    /// The remote collection is authoritative.
    Remote(Arc<dyn RecipeSource>),
    /// The snapshot store is authoritative; records never leave the device.
    LocalOnly(Arc<dyn SnapshotStore>),
}

/// In-memory recipe collection synchronised with its source of truth.
pub struct RecipeCache {
    mode: SyncMode,
    clock: Arc<dyn Clock>,
    records: RwLock<Vec<Recipe>>,
    write_gate: Mutex<()>,
    status: OperationStatus,
}

impl RecipeCache {
    /// An empty cache backed by the remote collection.
    ///
    /// Call [`RecipeCache::load`] to populate it.
    #[must_use]
    pub fn remote(source: Arc<dyn RecipeSource>, clock: Arc<dyn Clock>) -> Self {
        Self::with_mode(SyncMode::Remote(source), clock)
    }

    /// A local-only cache hydrated from `store`.
    ///
    /// Hydration failures never prevent construction: the cache starts empty
    /// and the failure is reported through [`RecipeCache::last_error`].
    pub async fn local_only(store: Arc<dyn SnapshotStore>, clock: Arc<dyn Clock>) -> Self {
        let cache = Self::with_mode(SyncMode::LocalOnly(store), clock);
        if let Err(err) = cache.load().await {
            tracing::warn!(error = %err, "local recipe snapshot could not be read");
        }
        cache
    }

    fn with_mode(mode: SyncMode, clock: Arc<dyn Clock>) -> Self {
        Self {
            mode,
            clock,
            records: RwLock::new(Vec::new()),
            write_gate: Mutex::new(()),
            status: OperationStatus::default(),
        }
    }

    /// Whether the cache writes through to a local snapshot.
    #[must_use]
    pub const fn is_local_only(&self) -> bool {
        matches!(self.mode, SyncMode::LocalOnly(_))
    }

    /// Whether any operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// Failure recorded by the most recent load or mutation, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<DomainError> {
        self.status.last_error()
    }

    /// Copy of the whole record set in cache order.
    #[must_use]
    pub fn recipes(&self) -> Vec<Recipe> {
        self.read().clone()
    }

    /// Number of cached records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the cache holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Look up a record by id.
    ///
    /// # Examples
    /// ```rust,ignore
    /// let by_text = cache.get_by_id(&RecipeId::parse("1")?);
    /// let by_number = cache.get_by_id(&RecipeId::from(1_u32));
    /// assert_eq!(by_text, by_number);
    /// ```
    #[must_use]
    pub fn get_by_id(&self, id: &RecipeId) -> Option<Recipe> {
        self.read().iter().find(|recipe| &recipe.id == id).cloned()
    }

    /// Records owned by the signed-in user; empty when anonymous.
    #[must_use]
    pub fn owned_recipes(&self, session: &SessionContext) -> Vec<Recipe> {
        let Some(user) = session.current_user() else {
            return Vec::new();
        };
        self.read()
            .iter()
            .filter(|recipe| recipe.is_owned_by(user.id()))
            .cloned()
            .collect()
    }

    /// Owned records marked as favourite; empty when anonymous.
    #[must_use]
    pub fn favorite_recipes(&self, session: &SessionContext) -> Vec<Recipe> {
        self.owned_recipes(session)
            .into_iter()
            .filter(|recipe| recipe.is_favorite)
            .collect()
    }

    /// Hold the snapshot write gate in local-only mode; remote mode is ungated.
    async fn local_write_gate(&self) -> Option<MutexGuard<'_, ()>> {
        match self.mode {
            SyncMode::LocalOnly(_) => Some(self.write_gate.lock().await),
            SyncMode::Remote(_) => None,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Recipe>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Recipe>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Authorise a mutation of `id` and return the current record.
    ///
    /// Order: unknown id, then missing user, then foreign owner.
    fn authorize(&self, session: &SessionContext, id: &RecipeId) -> Result<Recipe, DomainError> {
        let existing = self
            .get_by_id(id)
            .ok_or_else(|| DomainError::not_found(format!("recipe {id} not found")))?;
        let user = session.require_user()?;
        if !existing.is_owned_by(user.id()) {
            return Err(DomainError::unauthorized(format!(
                "recipe {id} belongs to another user"
            )));
        }
        Ok(existing)
    }
}

/// Drop later records whose id was already seen.
fn dedupe(recipes: Vec<Recipe>) -> Vec<Recipe> {
    let mut seen = HashSet::new();
    recipes
        .into_iter()
        .filter(|recipe| seen.insert(recipe.id.clone()))
        .collect()
}

#[cfg(test)]
mod local_tests;
