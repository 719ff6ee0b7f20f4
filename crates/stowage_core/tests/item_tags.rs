use rusqlite::Connection;
use stowage_core::db::open_db_in_memory;
use stowage_core::{
    CatalogError, ItemService, NewItem, OwnerId, SqliteItemRepository, SqliteTagRepository,
    TagService,
};

fn owner() -> OwnerId {
    OwnerId::new("owner-a")
}

fn join_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM item_tags;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn tags_dedupe_case_insensitively_across_items() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let item_a = items.create(&owner(), &NewItem::new("Lantern")).unwrap();
    let item_b = items.create(&owner(), &NewItem::new("Wreath")).unwrap();

    let tags_a = tags
        .set_item_tags(&owner(), item_a.id, &["Halloween".to_string()])
        .unwrap();
    let tags_b = tags
        .set_item_tags(&owner(), item_b.id, &["halloween".to_string()])
        .unwrap();

    assert_eq!(tags_a.len(), 1);
    assert_eq!(tags_b.len(), 1);
    assert_eq!(tags_a[0].id, tags_b[0].id);

    // Display casing is the one used at creation.
    assert_eq!(tags_b[0].name, "Halloween");

    let vocabulary = tags.list(&owner()).unwrap();
    assert_eq!(vocabulary.len(), 1);
    assert_eq!(vocabulary[0].name, "Halloween");
}

#[test]
fn resolve_or_create_reuses_existing_tag() {
    let conn = open_db_in_memory().unwrap();
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let first = tags.resolve_or_create(&owner(), "Camping").unwrap();
    let second = tags.resolve_or_create(&owner(), "  cAmPiNg ").unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Camping");
}

#[test]
fn set_item_tags_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let item = items.create(&owner(), &NewItem::new("Lantern")).unwrap();
    let desired = vec!["pumpkin".to_string(), "skeleton".to_string()];

    let first = tags.set_item_tags(&owner(), item.id, &desired).unwrap();
    let rows_after_first = join_row_count(&conn);
    let second = tags.set_item_tags(&owner(), item.id, &desired).unwrap();
    let rows_after_second = join_row_count(&conn);

    assert_eq!(first, second);
    assert_eq!(rows_after_first, 2);
    assert_eq!(rows_after_second, 2);
}

#[test]
fn set_item_tags_replaces_stale_associations_and_retains_tags() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let item = items.create(&owner(), &NewItem::new("Lantern")).unwrap();
    tags.set_item_tags(
        &owner(),
        item.id,
        &["pumpkin".to_string(), "skeleton".to_string()],
    )
    .unwrap();

    let replaced = tags
        .set_item_tags(
            &owner(),
            item.id,
            &["skeleton".to_string(), "ghost".to_string()],
        )
        .unwrap();
    let names: Vec<_> = replaced.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["ghost", "skeleton"]);

    // The detached tag stays in the vocabulary for future re-tagging.
    let vocabulary = tags.list(&owner()).unwrap();
    assert!(vocabulary.iter().any(|tag| tag.name == "pumpkin"));
}

#[test]
fn set_item_tags_dedupes_input_keeping_first_display_form() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let item = items.create(&owner(), &NewItem::new("Lantern")).unwrap();
    let applied = tags
        .set_item_tags(
            &owner(),
            item.id,
            &[
                "Work".to_string(),
                "IMPORTANT".to_string(),
                "work".to_string(),
            ],
        )
        .unwrap();

    let names: Vec<_> = applied.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["IMPORTANT", "Work"]);
}

#[test]
fn blank_tag_fails_validation_without_partial_writes() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let item = items.create(&owner(), &NewItem::new("Lantern")).unwrap();
    tags.set_item_tags(&owner(), item.id, &["pumpkin".to_string()])
        .unwrap();

    let err = tags
        .set_item_tags(
            &owner(),
            item.id,
            &["ghost".to_string(), "   ".to_string()],
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation(inner) if inner.field == "tags"));

    let unchanged = items.get(&owner(), item.id).unwrap();
    let names: Vec<_> = unchanged.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["pumpkin"]);
}

#[test]
fn set_item_tags_on_missing_item_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let err = tags
        .set_item_tags(&owner(), uuid::Uuid::new_v4(), &["pumpkin".to_string()])
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { entity: "item", .. }));
}

#[test]
fn delete_tag_blocks_while_in_use_then_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let item = items.create(&owner(), &NewItem::new("Lantern")).unwrap();
    let applied = tags
        .set_item_tags(&owner(), item.id, &["pumpkin".to_string()])
        .unwrap();
    let tag_id = applied[0].id;

    let err = tags.delete(&owner(), tag_id).unwrap_err();
    assert!(matches!(err, CatalogError::Conflict { entity: "tag", .. }));

    tags.set_item_tags(&owner(), item.id, &[]).unwrap();
    tags.delete(&owner(), tag_id).unwrap();
    assert!(tags.list(&owner()).unwrap().is_empty());
}

#[test]
fn deleting_item_removes_joins_but_keeps_tags() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let item = items.create(&owner(), &NewItem::new("Lantern")).unwrap();
    tags.set_item_tags(&owner(), item.id, &["pumpkin".to_string()])
        .unwrap();

    items.delete(&owner(), item.id).unwrap();

    assert_eq!(join_row_count(&conn), 0);
    let vocabulary = tags.list(&owner()).unwrap();
    assert_eq!(vocabulary.len(), 1);
    assert_eq!(vocabulary[0].name, "pumpkin");
}

#[test]
fn item_reads_carry_tags_sorted_by_name() {
    let conn = open_db_in_memory().unwrap();
    let items = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    let tags = TagService::new(SqliteTagRepository::try_new(&conn).unwrap());

    let item = items.create(&owner(), &NewItem::new("Lantern")).unwrap();
    tags.set_item_tags(
        &owner(),
        item.id,
        &["zebra".to_string(), "Apple".to_string()],
    )
    .unwrap();

    let loaded = items.get(&owner(), item.id).unwrap();
    let names: Vec<_> = loaded.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["Apple", "zebra"]);
}
