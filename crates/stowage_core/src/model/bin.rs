//! Bin domain model.
//!
//! A bin is a storage location. Bins form a forest per owner via
//! `parent_id`; the hierarchy service rejects any assignment that would make
//! a bin its own ancestor.

use crate::assets::AssetKey;
use crate::model::category::CategoryId;
use crate::model::{
    validate_name, validate_optional_text, Patch, ValidationError, LOCATION_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a bin.
pub type BinId = Uuid;

/// Bin read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bin {
    pub id: BinId,
    pub name: String,
    pub location: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Containing bin. `None` means root-level.
    pub parent_id: Option<BinId>,
    /// Opaque asset key owned by the object storage collaborator.
    pub photo_ref: Option<AssetKey>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Validated input for bin creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBin {
    pub name: String,
    pub location: Option<String>,
    pub category_id: Option<CategoryId>,
    pub parent_id: Option<BinId>,
    pub photo_ref: Option<AssetKey>,
}

impl NewBin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checks field constraints and returns the trimmed name on success.
    pub fn validate(&self) -> Result<String, ValidationError> {
        let name = validate_name("name", &self.name)?;
        validate_optional_text("location", self.location.as_deref(), LOCATION_MAX_CHARS)?;
        Ok(name)
    }
}

/// Partial update for a bin. Omitted fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinPatch {
    /// Required field: may be replaced but never cleared.
    pub name: Option<String>,
    pub location: Patch<String>,
    pub category_id: Patch<CategoryId>,
    pub parent_id: Patch<BinId>,
    pub photo_ref: Patch<AssetKey>,
}

impl BinPatch {
    /// Checks constraints on every supplied field; returns the trimmed name
    /// when one was supplied.
    pub fn validate(&self) -> Result<Option<String>, ValidationError> {
        let name = match self.name.as_deref() {
            Some(raw) => Some(validate_name("name", raw)?),
            None => None,
        };
        if let Patch::Set(location) = &self.location {
            validate_optional_text("location", Some(location), LOCATION_MAX_CHARS)?;
        }
        Ok(name)
    }
}
