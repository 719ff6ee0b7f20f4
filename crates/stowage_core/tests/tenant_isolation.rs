use stowage_core::db::open_db_in_memory;
use stowage_core::{
    BinService, CatalogError, CategoryService, ItemFilter, ItemPatch, ItemService, NewBin,
    NewCategory, NewItem, OwnerId, SqliteBinRepository, SqliteCategoryRepository,
    SqliteItemRepository, SqliteTagRepository, TagService,
};

fn owner_x() -> OwnerId {
    OwnerId::new("owner-x")
}

fn owner_y() -> OwnerId {
    OwnerId::new("owner-y")
}

#[test]
fn lists_and_filters_never_cross_owners() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let x_item = items.create(&owner_x(), &NewItem::new("Lantern")).unwrap();
    tags.set_item_tags(&owner_x(), x_item.id, &["halloween".to_string()])
        .unwrap();

    assert!(items.list(&owner_y()).unwrap().is_empty());

    let same_filter = ItemFilter {
        text: Some("lantern".to_string()),
        ..ItemFilter::new()
    };
    assert!(items.filter(&owner_y(), &same_filter).unwrap().is_empty());
    assert_eq!(items.filter(&owner_x(), &same_filter).unwrap().len(), 1);
}

#[test]
fn foreign_ids_are_indistinguishable_from_absent_ones() {
    let conn = open_db_in_memory().unwrap();
    let categories = CategoryService::new(SqliteCategoryRepository::try_new(&conn).unwrap());
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let x_category = categories
        .create(&owner_x(), &NewCategory::new("Seasonal"))
        .unwrap();
    let x_item = items.create(&owner_x(), &NewItem::new("Lantern")).unwrap();

    let get_err = categories.get(&owner_y(), x_category.id).unwrap_err();
    assert!(matches!(get_err, CatalogError::NotFound { entity: "category", .. }));

    let update_err = items
        .update(&owner_y(), x_item.id, &ItemPatch::default())
        .unwrap_err();
    assert!(matches!(update_err, CatalogError::NotFound { entity: "item", .. }));

    let delete_err = items.delete(&owner_y(), x_item.id).unwrap_err();
    assert!(matches!(delete_err, CatalogError::NotFound { entity: "item", .. }));

    // The foreign row is untouched.
    assert_eq!(items.list(&owner_x()).unwrap().len(), 1);
}

#[test]
fn references_cannot_target_foreign_entities() {
    let conn = open_db_in_memory().unwrap();
    let categories = CategoryService::new(SqliteCategoryRepository::try_new(&conn).unwrap());
    let bins = BinService::new(SqliteBinRepository::try_new(&conn).unwrap());
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let x_category = categories
        .create(&owner_x(), &NewCategory::new("Seasonal"))
        .unwrap();
    let x_bin = bins.create(&owner_x(), &NewBin::new("Garage")).unwrap();

    let bin_err = bins
        .create(
            &owner_y(),
            &NewBin {
                parent_id: Some(x_bin.id),
                ..NewBin::new("Shelf")
            },
        )
        .unwrap_err();
    assert!(matches!(bin_err, CatalogError::NotFound { entity: "bin", .. }));

    let item_err = items
        .create(
            &owner_y(),
            &NewItem {
                category_id: Some(x_category.id),
                ..NewItem::new("Lantern")
            },
        )
        .unwrap_err();
    assert!(matches!(item_err, CatalogError::NotFound { entity: "category", .. }));
}

#[test]
fn tag_vocabularies_are_scoped_per_owner() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let x_item = items.create(&owner_x(), &NewItem::new("Lantern")).unwrap();
    let y_item = items.create(&owner_y(), &NewItem::new("Wreath")).unwrap();

    let x_tags = tags
        .set_item_tags(&owner_x(), x_item.id, &["halloween".to_string()])
        .unwrap();
    let y_tags = tags
        .set_item_tags(&owner_y(), y_item.id, &["halloween".to_string()])
        .unwrap();

    // Same case-folded name, distinct per-owner tag records.
    assert_ne!(x_tags[0].id, y_tags[0].id);
    assert_eq!(tags.list(&owner_x()).unwrap().len(), 1);
    assert_eq!(tags.list(&owner_y()).unwrap().len(), 1);
}

#[test]
fn tag_deletion_respects_owner_scope() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let x_item = items.create(&owner_x(), &NewItem::new("Lantern")).unwrap();
    let x_tags = tags
        .set_item_tags(&owner_x(), x_item.id, &["halloween".to_string()])
        .unwrap();

    let err = tags.delete(&owner_y(), x_tags[0].id).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { entity: "tag", .. }));
}
