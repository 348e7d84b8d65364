//! Load and mutation operations for [`RecipeCache`].
//!
//! Every public operation follows the same shape: start an in-flight guard
//! (which clears the last error), take the local write gate, authorise,
//! perform I/O against the authoritative side, then commit to the record
//! set. Nothing is committed when any step fails.

use tracing::{debug, warn};

use crate::domain::ports::{NewRecipe, RecipeSourceError, SnapshotKey, SnapshotStore};
use crate::domain::{DomainError, Recipe, RecipeDraft, RecipeId, SessionContext};

use super::{RecipeCache, SyncMode, dedupe};

impl RecipeCache {
    /// Replace the record set from the source of truth.
    ///
    /// On failure the previous records are kept. A malformed local snapshot
    /// is discarded and the cache starts empty.
    pub async fn load(&self) -> Result<Vec<Recipe>, DomainError> {
        let _guard = self.status.begin();
        let _gate = self.local_write_gate().await;
        let result = self.perform_load().await;
        self.status.record(result)
    }

    /// Create a recipe owned by the signed-in user and return its id.
    pub async fn create(
        &self,
        session: &SessionContext,
        draft: RecipeDraft,
    ) -> Result<RecipeId, DomainError> {
        let _guard = self.status.begin();
        let _gate = self.local_write_gate().await;
        let result = self.perform_create(session, draft).await;
        self.status.record(result)
    }

    /// Apply `draft` to an owned recipe and return the stored result.
    pub async fn update(
        &self,
        session: &SessionContext,
        id: &RecipeId,
        draft: RecipeDraft,
    ) -> Result<Recipe, DomainError> {
        let _guard = self.status.begin();
        let _gate = self.local_write_gate().await;
        let result = self.perform_update(session, id, draft).await;
        self.status.record(result)
    }

    /// Delete an owned recipe.
    pub async fn delete(&self, session: &SessionContext, id: &RecipeId) -> Result<(), DomainError> {
        let _guard = self.status.begin();
        let _gate = self.local_write_gate().await;
        let result = self.perform_delete(session, id).await;
        self.status.record(result)
    }

    /// Flip the favourite flag of an owned recipe and return the stored result.
    pub async fn toggle_favorite(
        &self,
        session: &SessionContext,
        id: &RecipeId,
    ) -> Result<Recipe, DomainError> {
        let _guard = self.status.begin();
        let _gate = self.local_write_gate().await;
        let result = self.perform_toggle_favorite(session, id).await;
        self.status.record(result)
    }

    async fn perform_load(&self) -> Result<Vec<Recipe>, DomainError> {
        let recipes = match &self.mode {
            SyncMode::Remote(source) => {
                let listed = source.list().await.map_err(Self::map_source_error)?;
                dedupe(listed)
            }
            SyncMode::LocalOnly(store) => Self::read_snapshot(store.as_ref()).await?,
        };
        *self.write() = recipes.clone();
        debug!(count = recipes.len(), "loaded recipes");
        Ok(recipes)
    }

    async fn read_snapshot(store: &dyn SnapshotStore) -> Result<Vec<Recipe>, DomainError> {
        let Some(blob) = store.load(SnapshotKey::Recipes).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Recipe>>(&blob) {
            Ok(recipes) => Ok(dedupe(recipes)),
            Err(err) => {
                let malformed = DomainError::malformed_persisted_state(format!(
                    "recipe snapshot could not be parsed: {err}"
                ));
                warn!(key = %SnapshotKey::Recipes, error = %malformed, "discarding recipe snapshot");
                store.remove(SnapshotKey::Recipes).await?;
                Ok(Vec::new())
            }
        }
    }

    async fn perform_create(
        &self,
        session: &SessionContext,
        draft: RecipeDraft,
    ) -> Result<RecipeId, DomainError> {
        let owner_id = session.require_user()?.id().clone();
        draft.validate()?;

        let created = match &self.mode {
            SyncMode::Remote(source) => source
                .create(&NewRecipe { draft, owner_id })
                .await
                .map_err(Self::map_source_error)?,
            SyncMode::LocalOnly(store) => {
                let recipe =
                    Recipe::from_draft(RecipeId::generate(), owner_id, draft, self.clock.utc());
                let mut next = self.recipes();
                next.push(recipe.clone());
                Self::persist(store.as_ref(), &next).await?;
                recipe
            }
        };

        let id = created.id.clone();
        upsert(&mut self.write(), created);
        debug!(recipe_id = %id, "created recipe");
        Ok(id)
    }

    async fn perform_update(
        &self,
        session: &SessionContext,
        id: &RecipeId,
        draft: RecipeDraft,
    ) -> Result<Recipe, DomainError> {
        let existing = self.authorize(session, id)?;
        draft.validate()?;
        let merged = existing.revised(draft, self.clock.utc());

        let updated = match &self.mode {
            SyncMode::Remote(source) => source
                .update(id, &merged)
                .await
                .map_err(Self::map_source_error)?,
            SyncMode::LocalOnly(store) => {
                let next = self.recipes_with(id, &merged);
                Self::persist(store.as_ref(), &next).await?;
                merged
            }
        };

        self.replace(id, updated.clone());
        debug!(recipe_id = %id, "updated recipe");
        Ok(updated)
    }

    async fn perform_delete(&self, session: &SessionContext, id: &RecipeId) -> Result<(), DomainError> {
        self.authorize(session, id)?;

        match &self.mode {
            SyncMode::Remote(source) => {
                source.delete(id).await.map_err(Self::map_source_error)?;
            }
            SyncMode::LocalOnly(store) => {
                let mut next = self.recipes();
                next.retain(|recipe| &recipe.id != id);
                Self::persist(store.as_ref(), &next).await?;
            }
        }

        self.write().retain(|recipe| &recipe.id != id);
        debug!(recipe_id = %id, "deleted recipe");
        Ok(())
    }

    async fn perform_toggle_favorite(
        &self,
        session: &SessionContext,
        id: &RecipeId,
    ) -> Result<Recipe, DomainError> {
        let existing = self.authorize(session, id)?;
        let is_favorite = !existing.is_favorite;

        let toggled = match &self.mode {
            SyncMode::Remote(source) => source
                .set_favorite(id, is_favorite)
                .await
                .map_err(Self::map_source_error)?,
            SyncMode::LocalOnly(store) => {
                let flipped = Recipe {
                    is_favorite,
                    ..existing
                };
                let next = self.recipes_with(id, &flipped);
                Self::persist(store.as_ref(), &next).await?;
                flipped
            }
        };

        self.replace(id, toggled.clone());
        debug!(recipe_id = %id, is_favorite = toggled.is_favorite, "toggled favourite");
        Ok(toggled)
    }

    /// The current set with the record `id` replaced by `recipe`.
    fn recipes_with(&self, id: &RecipeId, recipe: &Recipe) -> Vec<Recipe> {
        self.read()
            .iter()
            .map(|current| {
                if &current.id == id {
                    recipe.clone()
                } else {
                    current.clone()
                }
            })
            .collect()
    }

    /// Replace the record `id` in place. A record removed meanwhile stays removed.
    fn replace(&self, id: &RecipeId, recipe: Recipe) {
        let mut records = self.write();
        let Some(slot) = records.iter_mut().find(|current| &current.id == id) else {
            debug!(recipe_id = %id, "recipe vanished before its update committed");
            return;
        };
        *slot = recipe;
    }

    async fn persist(store: &dyn SnapshotStore, recipes: &[Recipe]) -> Result<(), DomainError> {
        let blob = serde_json::to_string(recipes)
            .map_err(|err| DomainError::internal(format!("failed to encode recipe snapshot: {err}")))?;
        store.save(SnapshotKey::Recipes, &blob).await?;
        Ok(())
    }

    fn map_source_error(error: RecipeSourceError) -> DomainError {
        warn!(error = %error, "recipe source call failed");
        match error {
            RecipeSourceError::NotFound { message } => {
                DomainError::not_found(format!("recipe not found at source: {message}"))
            }
            other => DomainError::transport_failure(other.to_string()),
        }
    }
}

/// Replace the record with `recipe`'s id, or append it.
fn upsert(records: &mut Vec<Recipe>, recipe: Recipe) {
    let Some(index) = records.iter().position(|current| current.id == recipe.id) else {
        records.push(recipe);
        return;
    };
    if let Some(slot) = records.get_mut(index) {
        *slot = recipe;
    }
}
