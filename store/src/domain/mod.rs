//! Domain primitives, the session and the recipe cache.
//!
//! Purpose: define strongly typed records and the services that keep them
//! consistent. Adapters live in `outbound` and are reached only through the
//! traits in [`ports`].
//!
//! Public surface:
//! - DomainError (from `error`) — structured operation failure.
//! - ErrorCode (from `error`) — stable failure category.
//! - Recipe, RecipeDraft and RecipeId — cached records and their inputs.
//! - SessionContext and SessionService — who is signed in, and how.
//! - RecipeCache — the ownership-gated record cache.

pub mod auth;
pub mod error;
pub mod ports;
pub mod recipe;
mod recipe_cache;
pub mod session;
mod status;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError, Registration};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::recipe::{Recipe, RecipeDraft, RecipeId, RecipeValidationError};
pub use self::recipe_cache::{RecipeCache, SyncMode};
pub use self::session::{SessionContext, SessionService};
pub use self::user::{EmailAddress, User, UserId, UserValidationError, Username};

