//! Canonical catalog data model.
//!
//! # Responsibility
//! - Define the entity records, creation inputs, and update patches used by
//!   core business logic.
//! - Own field validation: bounds are checked here, before any SQL runs.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID generated at creation.
//! - Names are trimmed before validation and storage; a name that is blank
//!   after trimming is invalid.
//! - Patches distinguish "not supplied" from "explicitly cleared"; omitted
//!   fields are never implicitly nulled.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bin;
pub mod category;
pub mod item;
pub mod tag;

/// Maximum chars for entity names.
pub const NAME_MAX_CHARS: usize = 100;
/// Maximum chars for descriptions.
pub const DESCRIPTION_MAX_CHARS: usize = 500;
/// Maximum chars for bin locations.
pub const LOCATION_MAX_CHARS: usize = 200;
/// Maximum chars for item notes.
pub const NOTES_MAX_CHARS: usize = 1000;

/// A field failed a constraint check. Carries the offending field name so
/// callers can surface it without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid field `{}`: {}", self.field, self.message)
    }
}

impl Error for ValidationError {}

/// Partial-update wrapper for one optional field.
///
/// `Keep` leaves the stored value untouched, `Set` replaces it, `Clear`
/// nulls it. Required fields use `Option<T>` instead: they can be kept or
/// replaced but never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

// Hand-written so `Patch<T>: Default` holds without a `T: Default` bound.
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Validates a required name field and returns the trimmed form.
pub(crate) fn validate_name(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(ValidationError::new(
            field,
            format!("must be at most {NAME_MAX_CHARS} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Validates an optional bounded text field.
pub(crate) fn validate_optional_text(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if value.chars().count() > max_chars {
            return Err(ValidationError::new(
                field,
                format!("must be at most {max_chars} characters"),
            ));
        }
    }
    Ok(())
}
