//! Driven port for the remote recipe collection.
//!
//! The [`RecipeSource`] trait is the cache's only view of the remote source
//! of truth. Every successful response is treated as authoritative: the
//! cache stores what the source returns, not what it sent.

use async_trait::async_trait;

use crate::domain::{Recipe, RecipeDraft, RecipeId, UserId};

use super::define_port_error;

/// Payload for creating a recipe on the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    /// Editable fields supplied by the caller.
    pub draft: RecipeDraft,
    /// Signed-in user who will own the record.
    pub owner_id: UserId,
}

define_port_error! {
    /// Errors surfaced while calling the remote collection.
    pub enum RecipeSourceError {
        /// Network transport failed or the server reported a fault.
        Transport { message: String } =>
            "recipe source transport failed: {message}",
        /// The call exceeded the client timeout.
        Timeout { message: String } =>
            "recipe source timed out: {message}",
        /// The addressed recipe does not exist remotely.
        NotFound { message: String } =>
            "recipe not found at source: {message}",
        /// The remote rejected the request as invalid or forbidden.
        Rejected { message: String } =>
            "recipe source rejected request: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "recipe source response decode failed: {message}",
    }
}

/// Port for the remote recipe collection endpoint.
///
/// # Examples
///
/// ```rust,ignore
/// use recipe_store::domain::ports::RecipeSource;
///
/// let recipes = source.list().await?;
/// println!("{} recipes", recipes.len());
/// # Ok::<(), recipe_store::domain::ports::RecipeSourceError>(())
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Fetch the full collection.
    async fn list(&self) -> Result<Vec<Recipe>, RecipeSourceError>;

    /// Create a record; the source assigns id and timestamps.
    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeSourceError>;

    /// Replace a record with the merged payload.
    async fn update(&self, id: &RecipeId, recipe: &Recipe) -> Result<Recipe, RecipeSourceError>;

    /// Set only the favourite flag of a record.
    async fn set_favorite(
        &self,
        id: &RecipeId,
        is_favorite: bool,
    ) -> Result<Recipe, RecipeSourceError>;

    /// Remove a record.
    async fn delete(&self, id: &RecipeId) -> Result<(), RecipeSourceError>;
}

/// Fixture implementation backed by an empty, read-only collection.
///
/// Listing succeeds with no records; every write is rejected. Use it where
/// a remote-backed cache is needed but remote behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecipeSource;

#[async_trait]
impl RecipeSource for FixtureRecipeSource {
    async fn list(&self) -> Result<Vec<Recipe>, RecipeSourceError> {
        Ok(Vec::new())
    }

    async fn create(&self, _recipe: &NewRecipe) -> Result<Recipe, RecipeSourceError> {
        Err(RecipeSourceError::rejected("fixture source is read-only"))
    }

    async fn update(&self, _id: &RecipeId, _recipe: &Recipe) -> Result<Recipe, RecipeSourceError> {
        Err(RecipeSourceError::rejected("fixture source is read-only"))
    }

    async fn set_favorite(
        &self,
        _id: &RecipeId,
        _is_favorite: bool,
    ) -> Result<Recipe, RecipeSourceError> {
        Err(RecipeSourceError::rejected("fixture source is read-only"))
    }

    async fn delete(&self, _id: &RecipeId) -> Result<(), RecipeSourceError> {
        Err(RecipeSourceError::rejected("fixture source is read-only"))
    }
}
