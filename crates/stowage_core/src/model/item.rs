//! Item domain model.
//!
//! An item is one cataloged object. It may be filed in a bin (absence means
//! "unfiled"), classified by a category, and carry any number of tags.

use crate::assets::AssetKey;
use crate::model::bin::BinId;
use crate::model::category::CategoryId;
use crate::model::tag::Tag;
use crate::model::{
    validate_name, validate_optional_text, Patch, ValidationError, DESCRIPTION_MAX_CHARS,
    NOTES_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an item.
pub type ItemId = Uuid;

/// Physical condition of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Good,
    Damaged,
    Broken,
}

/// Item read model. Tags are loaded alongside the record, ordered
/// case-insensitively by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub condition: Option<Condition>,
    pub notes: Option<String>,
    /// Containing bin. `None` means unfiled.
    pub bin_id: Option<BinId>,
    pub category_id: Option<CategoryId>,
    /// Opaque asset key owned by the object storage collaborator.
    pub photo_ref: Option<AssetKey>,
    pub tags: Vec<Tag>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Validated input for item creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub condition: Option<Condition>,
    pub notes: Option<String>,
    pub bin_id: Option<BinId>,
    pub category_id: Option<CategoryId>,
    pub photo_ref: Option<AssetKey>,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checks field constraints and returns the trimmed name on success.
    pub fn validate(&self) -> Result<String, ValidationError> {
        let name = validate_name("name", &self.name)?;
        validate_optional_text(
            "description",
            self.description.as_deref(),
            DESCRIPTION_MAX_CHARS,
        )?;
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX_CHARS)?;
        Ok(name)
    }
}

/// Partial update for an item. Omitted fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    /// Required field: may be replaced but never cleared.
    pub name: Option<String>,
    pub description: Patch<String>,
    pub condition: Patch<Condition>,
    pub notes: Patch<String>,
    pub bin_id: Patch<BinId>,
    pub category_id: Patch<CategoryId>,
    pub photo_ref: Patch<AssetKey>,
}

impl ItemPatch {
    /// Checks constraints on every supplied field; returns the trimmed name
    /// when one was supplied.
    pub fn validate(&self) -> Result<Option<String>, ValidationError> {
        let name = match self.name.as_deref() {
            Some(raw) => Some(validate_name("name", raw)?),
            None => None,
        };
        if let Patch::Set(description) = &self.description {
            validate_optional_text("description", Some(description), DESCRIPTION_MAX_CHARS)?;
        }
        if let Patch::Set(notes) = &self.notes {
            validate_optional_text("notes", Some(notes), NOTES_MAX_CHARS)?;
        }
        Ok(name)
    }
}
