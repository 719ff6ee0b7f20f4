//! Tag index use-case service.
//!
//! # Responsibility
//! - Normalize raw tag input (trim, reject blanks, case-fold dedup) before
//!   it reaches the store.
//! - Provide the resolve-or-create, set, list, and guarded-delete surface.
//!
//! # Invariants
//! - Applying the same desired tag list twice yields the same associations.
//! - Validation failures happen before any write.

use crate::identity::OwnerId;
use crate::model::item::ItemId;
use crate::model::tag::{normalize_tag, normalize_tag_inputs, Tag, TagId};
use crate::repo::tag_repo::TagRepository;
use crate::repo::CatalogResult;

/// Tag service facade.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolves a raw tag string to the owner's canonical tag, creating it
    /// with the given display casing when no case-fold match exists.
    pub fn resolve_or_create(&self, owner: &OwnerId, raw: &str) -> CatalogResult<Tag> {
        let display = normalize_tag(raw)?;
        self.repo.resolve_or_create_tag(owner, &display)
    }

    /// Replaces an item's tag set with the desired raw list. Returns the
    /// final association set ordered case-insensitively by name.
    pub fn set_item_tags(
        &self,
        owner: &OwnerId,
        item: ItemId,
        raw_tags: &[String],
    ) -> CatalogResult<Vec<Tag>> {
        let displays = normalize_tag_inputs(raw_tags)?;
        self.repo.set_item_tags(owner, item, &displays)
    }

    /// Lists the owner's tag vocabulary with display casing.
    pub fn list(&self, owner: &OwnerId) -> CatalogResult<Vec<Tag>> {
        self.repo.list_tags(owner)
    }

    /// Deletes one tag, failing with a conflict while any item carries it.
    pub fn delete(&self, owner: &OwnerId, id: TagId) -> CatalogResult<()> {
        self.repo.delete_tag(owner, id)
    }
}
