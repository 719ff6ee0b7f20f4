//! Core domain logic for the Stowage inventory catalog.
//! This crate is the single source of truth for catalog invariants:
//! tenant scoping, the acyclic bin hierarchy, tag deduplication, and the
//! faceted item query.

pub mod assets;
pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use assets::{AssetKey, MemoryObjectStore, ObjectStore, ObjectStoreError};
pub use identity::{IdentityProvider, OwnerId, StaticIdentity};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bin::{Bin, BinId, BinPatch, NewBin};
pub use model::category::{Category, CategoryId, CategoryPatch, NewCategory};
pub use model::item::{Condition, Item, ItemId, ItemPatch, NewItem};
pub use model::tag::{Tag, TagId};
pub use model::{Patch, ValidationError};
pub use repo::bin_repo::{BinRepository, SqliteBinRepository};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{CatalogError, CatalogResult};
pub use search::filter::{filter_items, item_matches, ItemFilter};
pub use service::bin_service::BinService;
pub use service::category_service::CategoryService;
pub use service::item_service::ItemService;
pub use service::tag_service::TagService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
