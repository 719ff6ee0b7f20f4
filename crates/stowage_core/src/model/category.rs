//! Category domain model.
//!
//! A category is a classification label applicable to bins and items. It is
//! referenced, never containing: deleting a category is blocked while any
//! bin or item still points at it.

use crate::model::{
    validate_name, validate_optional_text, Patch, ValidationError, DESCRIPTION_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a category.
pub type CategoryId = Uuid;

/// Category read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Validated input for category creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
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
        Ok(name)
    }
}

/// Partial update for a category. Omitted fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    /// Required field: may be replaced but never cleared.
    pub name: Option<String>,
    pub description: Patch<String>,
}

impl CategoryPatch {
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
        Ok(name)
    }
}
