//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `stowage_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use std::error::Error;

use stowage_core::db::open_db_in_memory;
use stowage_core::{
    BinService, CategoryService, IdentityProvider, ItemFilter, ItemService, NewBin, NewCategory,
    NewItem, OwnerId, SqliteBinRepository, SqliteCategoryRepository, SqliteItemRepository,
    SqliteTagRepository, StaticIdentity, TagService,
};

fn main() -> Result<(), Box<dyn Error>> {
    println!("stowage_core version={}", stowage_core::core_version());

    let identity = StaticIdentity::new(OwnerId::new("local"));
    let owner = identity.current_owner();
    let conn = open_db_in_memory()?;

    let categories = CategoryService::new(SqliteCategoryRepository::try_new(&conn)?);
    let bins = BinService::new(SqliteBinRepository::try_new(&conn)?);
    let items = ItemService::new(SqliteItemRepository::try_new(&conn)?);
    let tags = TagService::new(SqliteTagRepository::try_new(&conn)?);

    let seasonal = categories.create(&owner, &NewCategory::new("Seasonal"))?;

    let garage = bins.create(&owner, &NewBin::new("Garage"))?;
    let shelf = bins.create(
        &owner,
        &NewBin {
            parent_id: Some(garage.id),
            ..NewBin::new("Top shelf")
        },
    )?;

    let lantern = items.create(
        &owner,
        &NewItem {
            bin_id: Some(shelf.id),
            category_id: Some(seasonal.id),
            ..NewItem::new("Paper lantern")
        },
    )?;
    let lantern_tags =
        tags.set_item_tags(&owner, lantern.id, &["Halloween".to_string()])?;

    let halloween = ItemFilter {
        tag_ids: lantern_tags.iter().map(|tag| tag.id).collect(),
        ..ItemFilter::new()
    };
    let matches = items.filter(&owner, &halloween)?;

    println!("categories={}", categories.list(&owner)?.len());
    println!("bins={}", bins.list(&owner)?.len());
    println!("items={}", items.list(&owner)?.len());
    println!("tagged_matches={}", matches.len());

    Ok(())
}
