//! Item use-case service.
//!
//! # Invariants
//! - Referenced bins and categories must exist for the same owner.
//! - Deleting an item removes its tag joins; the tags themselves survive.

use crate::identity::OwnerId;
use crate::model::bin::BinId;
use crate::model::category::CategoryId;
use crate::model::item::{Item, ItemId, ItemPatch, NewItem};
use crate::model::Patch;
use crate::repo::item_repo::ItemRepository;
use crate::repo::{CatalogError, CatalogResult};
use crate::search::filter::{filter_items, ItemFilter};

/// Item service facade.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one item after validating its references.
    pub fn create(&self, owner: &OwnerId, new: &NewItem) -> CatalogResult<Item> {
        if let Some(bin_id) = new.bin_id {
            self.ensure_bin_exists(owner, bin_id)?;
        }
        if let Some(category_id) = new.category_id {
            self.ensure_category_exists(owner, category_id)?;
        }
        self.repo.create_item(owner, new)
    }

    /// Gets one item by id, tags included.
    pub fn get(&self, owner: &OwnerId, id: ItemId) -> CatalogResult<Item> {
        self.repo
            .get_item(owner, id)?
            .ok_or(CatalogError::NotFound { entity: "item", id })
    }

    /// Applies a partial update; omitted fields stay untouched.
    pub fn update(&self, owner: &OwnerId, id: ItemId, patch: &ItemPatch) -> CatalogResult<Item> {
        if let Patch::Set(bin_id) = patch.bin_id {
            self.ensure_bin_exists(owner, bin_id)?;
        }
        if let Patch::Set(category_id) = patch.category_id {
            self.ensure_category_exists(owner, category_id)?;
        }
        self.repo.update_item(owner, id, patch)
    }

    /// Deletes one item and its tag joins.
    pub fn delete(&self, owner: &OwnerId, id: ItemId) -> CatalogResult<()> {
        self.repo.delete_item(owner, id)
    }

    /// Lists the owner's items in creation order.
    pub fn list(&self, owner: &OwnerId) -> CatalogResult<Vec<Item>> {
        self.repo.list_items(owner)
    }

    /// Answers the composite facet query over the owner's items.
    pub fn filter(&self, owner: &OwnerId, filter: &ItemFilter) -> CatalogResult<Vec<Item>> {
        filter_items(&self.repo, owner, filter)
    }

    fn ensure_bin_exists(&self, owner: &OwnerId, id: BinId) -> CatalogResult<()> {
        if !self.repo.bin_exists(owner, id)? {
            return Err(CatalogError::NotFound { entity: "bin", id });
        }
        Ok(())
    }

    fn ensure_category_exists(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<()> {
        if !self.repo.category_exists(owner, id)? {
            return Err(CatalogError::NotFound {
                entity: "category",
                id,
            });
        }
        Ok(())
    }
}
