//! Bin hierarchy use-case service.
//!
//! # Responsibility
//! - Validate hierarchy invariants above the repository layer.
//! - Reject any parent assignment that would make a bin its own ancestor.
//!
//! # Invariants
//! - Referenced parents and categories must exist for the same owner.
//! - The ancestor walk is bounded by the owner's current bin count, so it
//!   terminates even on corrupt persisted state.
//! - A failed check leaves the bin unchanged.

use crate::identity::OwnerId;
use crate::model::bin::{Bin, BinId, BinPatch, NewBin};
use crate::model::category::CategoryId;
use crate::model::Patch;
use crate::repo::bin_repo::BinRepository;
use crate::repo::{CatalogError, CatalogResult};

/// Bin service facade; owns hierarchy validation.
pub struct BinService<R: BinRepository> {
    repo: R,
}

impl<R: BinRepository> BinService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one bin after validating its references.
    ///
    /// A fresh bin cannot be an ancestor of anything, so only parent
    /// existence is checked here, not cycles.
    pub fn create(&self, owner: &OwnerId, new: &NewBin) -> CatalogResult<Bin> {
        if let Some(category_id) = new.category_id {
            self.ensure_category_exists(owner, category_id)?;
        }
        if let Some(parent_id) = new.parent_id {
            self.ensure_bin_exists(owner, parent_id)?;
        }
        self.repo.create_bin(owner, new)
    }

    /// Gets one bin by id.
    pub fn get(&self, owner: &OwnerId, id: BinId) -> CatalogResult<Bin> {
        self.repo
            .get_bin(owner, id)?
            .ok_or(CatalogError::NotFound { entity: "bin", id })
    }

    /// Applies a partial update; omitted fields stay untouched. A supplied
    /// parent is checked for existence and cycle-freedom before any write.
    pub fn update(&self, owner: &OwnerId, id: BinId, patch: &BinPatch) -> CatalogResult<Bin> {
        if let Patch::Set(category_id) = patch.category_id {
            self.ensure_category_exists(owner, category_id)?;
        }
        if let Patch::Set(parent_id) = patch.parent_id {
            self.ensure_bin_exists(owner, parent_id)?;
            self.ensure_no_cycle(owner, id, parent_id)?;
        }
        self.repo.update_bin(owner, id, patch)
    }

    /// Deletes one bin: children reparent to the deleted bin's own parent,
    /// filed items become unfiled. Executed atomically by the repository.
    pub fn delete(&self, owner: &OwnerId, id: BinId) -> CatalogResult<()> {
        self.repo.delete_bin(owner, id)
    }

    /// Lists the owner's bins in creation order.
    pub fn list(&self, owner: &OwnerId) -> CatalogResult<Vec<Bin>> {
        self.repo.list_bins(owner)
    }

    /// Walks the candidate parent's ancestor chain; encountering the moving
    /// bin anywhere (including the first step, i.e. self-parenting) is a
    /// cycle. The walk is bounded by the owner's bin count.
    fn ensure_no_cycle(&self, owner: &OwnerId, bin: BinId, parent: BinId) -> CatalogResult<()> {
        let bound = self.repo.count_bins(owner)?;
        let mut current = Some(parent);
        let mut hops: u64 = 0;

        while let Some(ancestor) = current {
            if ancestor == bin {
                return Err(CatalogError::Cycle { bin, parent });
            }
            if hops >= bound {
                break;
            }
            hops += 1;
            current = self
                .repo
                .get_bin(owner, ancestor)?
                .and_then(|record| record.parent_id);
        }

        Ok(())
    }

    fn ensure_bin_exists(&self, owner: &OwnerId, id: BinId) -> CatalogResult<()> {
        if self.repo.get_bin(owner, id)?.is_none() {
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
