//! Category use-case service.
//!
//! # Invariants
//! - `get`/`update`/`delete` on an absent or foreign id fail uniformly with
//!   not-found.
//! - Deletion is blocked while any bin or item references the category.

use crate::identity::OwnerId;
use crate::model::category::{Category, CategoryId, CategoryPatch, NewCategory};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::{CatalogError, CatalogResult};

/// Category service facade.
pub struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one category after field validation.
    pub fn create(&self, owner: &OwnerId, new: &NewCategory) -> CatalogResult<Category> {
        self.repo.create_category(owner, new)
    }

    /// Gets one category by id.
    pub fn get(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<Category> {
        self.repo
            .get_category(owner, id)?
            .ok_or(CatalogError::NotFound {
                entity: "category",
                id,
            })
    }

    /// Applies a partial update; omitted fields stay untouched.
    pub fn update(
        &self,
        owner: &OwnerId,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> CatalogResult<Category> {
        self.repo.update_category(owner, id, patch)
    }

    /// Deletes one category, failing with a conflict while referenced.
    pub fn delete(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<()> {
        self.repo.delete_category(owner, id)
    }

    /// Lists the owner's categories in creation order.
    pub fn list(&self, owner: &OwnerId) -> CatalogResult<Vec<Category>> {
        self.repo.list_categories(owner)
    }
}
