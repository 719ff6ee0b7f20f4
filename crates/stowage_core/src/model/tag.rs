//! Tag domain model and normalization rules.
//!
//! # Invariants
//! - Tag identity is the case-folded, trimmed name, unique per owner.
//! - The stored display name keeps the casing used at creation.

use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a tag.
pub type TagId = Uuid;

/// Tag read model. `name` is the preserved display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Normalizes one raw tag value: trims whitespace and rejects blank input.
/// The returned string is the display form; the dedup key is its case-fold.
pub fn normalize_tag(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("tags", "tag must not be blank"));
    }
    Ok(trimmed.to_string())
}

/// Returns the case-folded dedup key for a display-form tag.
pub fn tag_key(display: &str) -> String {
    display.to_lowercase()
}

/// Normalizes a desired tag list: trims every entry, rejects blanks, and
/// drops case-fold duplicates keeping the first display form and its order.
pub fn normalize_tag_inputs(raw_tags: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    for raw in raw_tags {
        let display = normalize_tag(raw)?;
        if seen.insert(tag_key(&display)) {
            result.push(display);
        }
    }
    Ok(result)
}
