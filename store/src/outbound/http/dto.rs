//! Request bodies sent to the recipe collection.
//!
//! Responses decode straight into the domain `Recipe`, whose serde shape is
//! the wire contract; only the write payloads need their own types.

use serde::Serialize;

use crate::domain::ports::NewRecipe;
use crate::domain::{RecipeDraft, UserId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateRecipeDto<'a> {
    #[serde(flatten)]
    pub(super) draft: &'a RecipeDraft,
    pub(super) user_id: &'a UserId,
}

impl<'a> From<&'a NewRecipe> for CreateRecipeDto<'a> {
    fn from(value: &'a NewRecipe) -> Self {
        Self {
            draft: &value.draft,
            user_id: &value.owner_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FavoriteDto {
    pub(super) is_favorite: bool,
}
