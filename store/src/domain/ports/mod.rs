//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod recipe_source;
mod snapshot_store;

#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use recipe_source::MockRecipeSource;
pub use recipe_source::{FixtureRecipeSource, NewRecipe, RecipeSource, RecipeSourceError};
#[cfg(test)]
pub use snapshot_store::MockSnapshotStore;
pub use snapshot_store::{FixtureSnapshotStore, SnapshotKey, SnapshotStore, SnapshotStoreError};
