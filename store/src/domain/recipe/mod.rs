//! Recipe records and the drafts callers submit to create or edit them.
//!
//! Purpose: define the cached record shape and the canonical identifier used
//! for every lookup. Identifiers reach the cache from several places (remote
//! JSON, snapshot files, command-line arguments) and not always in the same
//! representation, so [`RecipeId`] normalises all of them to one string form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, UserId};

/// Validation errors raised by recipe identifiers and drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    /// The identifier was blank.
    EmptyId,
    /// The title was blank.
    EmptyTitle,
    /// Servings must be at least one.
    ZeroServings,
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "recipe id must not be empty"),
            Self::EmptyTitle => write!(f, "recipe title must not be empty"),
            Self::ZeroServings => write!(f, "recipe servings must be at least 1"),
        }
    }
}

impl std::error::Error for RecipeValidationError {}

impl From<RecipeValidationError> for DomainError {
    fn from(value: RecipeValidationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

/// Canonical recipe identifier.
///
/// The canonical form is the trimmed string representation, so a record
/// stored with id `"1"` is found when queried with the integer `1` and the
/// other way round. Decoding accepts either a JSON string or a JSON number.
///
/// # Examples
/// ```
/// use recipe_store::domain::RecipeId;
///
/// let stored = RecipeId::parse(" 1 ").unwrap();
/// assert_eq!(stored, RecipeId::from(1_u64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRecipeId", into = "String")]
pub struct RecipeId(String);

impl RecipeId {
    /// Normalise and validate a textual identifier.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, RecipeValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RecipeValidationError::EmptyId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generate a fresh identifier for records created without a remote.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for RecipeId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for RecipeId {
    type Err = RecipeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<RecipeId> for String {
    fn from(value: RecipeId) -> Self {
        value.0
    }
}

impl TryFrom<String> for RecipeId {
    type Error = RecipeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for RecipeId {
    type Error = RecipeValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

macro_rules! recipe_id_from_integer {
    ($($int:ty),*) => {
        $(
            impl From<$int> for RecipeId {
                fn from(value: $int) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

recipe_id_from_integer!(u32, u64, i32, i64, usize);

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRecipeId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl TryFrom<RawRecipeId> for RecipeId {
    type Error = RecipeValidationError;

    fn try_from(value: RawRecipeId) -> Result<Self, Self::Error> {
        match value {
            RawRecipeId::Text(text) => Self::parse(text),
            RawRecipeId::Unsigned(number) => Ok(Self::from(number)),
            RawRecipeId::Signed(number) => Ok(Self::from(number)),
        }
    }
}

/// Caller-supplied payload for creating or editing a recipe.
///
/// Carries every editable field; identity, ownership, the favourite flag
/// and timestamps are assigned by whichever side is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    /// Display title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Ingredient lines in display order.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Method steps in display order.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Preparation time in minutes.
    pub prep_time: u32,
    /// Cooking time in minutes.
    pub cook_time: u32,
    /// Number of portions; at least one.
    pub servings: u32,
    /// Optional cover image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl RecipeDraft {
    /// Check the draft invariants that the type system does not encode.
    pub fn validate(&self) -> Result<(), RecipeValidationError> {
        if self.title.trim().is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        if self.servings == 0 {
            return Err(RecipeValidationError::ZeroServings);
        }
        Ok(())
    }
}

/// Cached recipe record.
///
/// ## Invariants
/// - `id` is unique within a cache.
/// - `owner_id` never changes after creation.
/// - `updated_at >= created_at`.
///
/// On the wire the owner is carried as `userId`; `ownerId` is accepted when
/// decoding, and numeric owner ids decode to their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Canonical identifier.
    pub id: RecipeId,
    /// Display title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Ingredient lines in display order.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Method steps in display order.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Preparation time in minutes.
    pub prep_time: u32,
    /// Cooking time in minutes.
    pub cook_time: u32,
    /// Number of portions.
    pub servings: u32,
    /// Optional cover image location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Creating user; the only user allowed to mutate the record.
    #[serde(rename = "userId", alias = "ownerId")]
    pub owner_id: UserId,
    /// Whether the owner marked the recipe as a favourite.
    #[serde(default)]
    pub is_favorite: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last edit instant.
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Build a new, non-favourite record from a draft.
    #[must_use]
    pub fn from_draft(
        id: RecipeId,
        owner_id: UserId,
        draft: RecipeDraft,
        now: DateTime<Utc>,
    ) -> Self {
        let RecipeDraft {
            title,
            description,
            ingredients,
            instructions,
            prep_time,
            cook_time,
            servings,
            image_url,
        } = draft;
        Self {
            id,
            title,
            description,
            ingredients,
            instructions,
            prep_time,
            cook_time,
            servings,
            image_url,
            owner_id,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an edit onto this record.
    ///
    /// Identity, owner, favourite flag and creation time carry over; the
    /// edit time never precedes the creation time.
    #[must_use]
    pub fn revised(&self, draft: RecipeDraft, now: DateTime<Utc>) -> Self {
        let mut revised = Self::from_draft(self.id.clone(), self.owner_id.clone(), draft, now);
        revised.is_favorite = self.is_favorite;
        revised.created_at = self.created_at;
        revised.updated_at = now.max(self.created_at);
        revised
    }

    /// Whether `user_id` owns this record.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// The editable fields of this record as a draft.
    #[must_use]
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
            image_url: self.image_url.clone(),
        }
    }
}
