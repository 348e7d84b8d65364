//! HTTP outbound adapters.
//!
//! Provides a reqwest implementation of the `RecipeSource` port.

mod dto;
mod recipe_source;

pub use recipe_source::HttpRecipeSource;
