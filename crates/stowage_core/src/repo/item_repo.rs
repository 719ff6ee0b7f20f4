//! Item repository contract and SQLite implementation.
//!
//! # Invariants
//! - All queries are constrained to the caller's owner scope.
//! - Item reads carry the item's tags, ordered case-insensitively by name.
//! - Item deletion removes the item's tag joins in the same transaction;
//!   the tags themselves are retained.

use crate::assets::AssetKey;
use crate::identity::OwnerId;
use crate::model::bin::BinId;
use crate::model::category::CategoryId;
use crate::model::item::{Condition, Item, ItemId, ItemPatch, NewItem};
use crate::model::tag::Tag;
use crate::model::Patch;
use crate::repo::{
    ensure_catalog_connection_ready, parse_uuid, with_transient_retry, CatalogError, CatalogResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    condition,
    notes,
    bin_uuid,
    category_uuid,
    photo_ref,
    created_at,
    updated_at
FROM items";

/// Repository interface for item CRUD and reference lookups.
pub trait ItemRepository {
    fn create_item(&self, owner: &OwnerId, new: &NewItem) -> CatalogResult<Item>;
    fn get_item(&self, owner: &OwnerId, id: ItemId) -> CatalogResult<Option<Item>>;
    fn update_item(&self, owner: &OwnerId, id: ItemId, patch: &ItemPatch) -> CatalogResult<Item>;
    /// Deletes one item and its tag joins.
    fn delete_item(&self, owner: &OwnerId, id: ItemId) -> CatalogResult<()>;
    /// Lists the owner's items in creation order, tags included.
    fn list_items(&self, owner: &OwnerId) -> CatalogResult<Vec<Item>>;
    /// Owner-scoped existence check for a bin reference.
    fn bin_exists(&self, owner: &OwnerId, id: BinId) -> CatalogResult<bool>;
    /// Owner-scoped existence check for a category reference.
    fn category_exists(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<bool>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, owner: &OwnerId, new: &NewItem) -> CatalogResult<Item> {
        let name = new.validate()?;
        let id = Uuid::new_v4();
        with_transient_retry(|| {
            self.conn.execute(
                "INSERT INTO items (
                    uuid,
                    owner_id,
                    name,
                    description,
                    condition,
                    notes,
                    bin_uuid,
                    category_uuid,
                    photo_ref
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    id.to_string(),
                    owner.as_str(),
                    name.as_str(),
                    new.description.as_deref(),
                    new.condition.map(condition_to_db),
                    new.notes.as_deref(),
                    new.bin_id.map(|value| value.to_string()),
                    new.category_id.map(|value| value.to_string()),
                    new.photo_ref.as_ref().map(|key| key.as_str().to_string()),
                ],
            )?;
            Ok(())
        })?;
        load_required_item(self.conn, owner, id)
    }

    fn get_item(&self, owner: &OwnerId, id: ItemId) -> CatalogResult<Option<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE uuid = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
        if let Some(row) = rows.next()? {
            let item = parse_item_row(self.conn, row)?;
            return Ok(Some(item));
        }
        Ok(None)
    }

    fn update_item(&self, owner: &OwnerId, id: ItemId, patch: &ItemPatch) -> CatalogResult<Item> {
        let name = patch.validate()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = name {
            sets.push("name = ?");
            bind_values.push(Value::Text(name));
        }
        match &patch.description {
            Patch::Keep => {}
            Patch::Set(description) => {
                sets.push("description = ?");
                bind_values.push(Value::Text(description.clone()));
            }
            Patch::Clear => sets.push("description = NULL"),
        }
        match &patch.condition {
            Patch::Keep => {}
            Patch::Set(condition) => {
                sets.push("condition = ?");
                bind_values.push(Value::Text(condition_to_db(*condition).to_string()));
            }
            Patch::Clear => sets.push("condition = NULL"),
        }
        match &patch.notes {
            Patch::Keep => {}
            Patch::Set(notes) => {
                sets.push("notes = ?");
                bind_values.push(Value::Text(notes.clone()));
            }
            Patch::Clear => sets.push("notes = NULL"),
        }
        match &patch.bin_id {
            Patch::Keep => {}
            Patch::Set(bin_id) => {
                sets.push("bin_uuid = ?");
                bind_values.push(Value::Text(bin_id.to_string()));
            }
            Patch::Clear => sets.push("bin_uuid = NULL"),
        }
        match &patch.category_id {
            Patch::Keep => {}
            Patch::Set(category_id) => {
                sets.push("category_uuid = ?");
                bind_values.push(Value::Text(category_id.to_string()));
            }
            Patch::Clear => sets.push("category_uuid = NULL"),
        }
        match &patch.photo_ref {
            Patch::Keep => {}
            Patch::Set(photo_ref) => {
                sets.push("photo_ref = ?");
                bind_values.push(Value::Text(photo_ref.as_str().to_string()));
            }
            Patch::Clear => sets.push("photo_ref = NULL"),
        }
        sets.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!(
            "UPDATE items SET {} WHERE uuid = ? AND owner_id = ?;",
            sets.join(", ")
        );
        bind_values.push(Value::Text(id.to_string()));
        bind_values.push(Value::Text(owner.as_str().to_string()));

        let changed = with_transient_retry(|| {
            Ok(self
                .conn
                .execute(&sql, params_from_iter(bind_values.clone()))?)
        })?;
        if changed == 0 {
            return Err(CatalogError::not_found("item", id));
        }

        load_required_item(self.conn, owner, id)
    }

    fn delete_item(&self, owner: &OwnerId, id: ItemId) -> CatalogResult<()> {
        with_transient_retry(|| self.delete_item_once(owner, id))
    }

    fn list_items(&self, owner: &OwnerId) -> CatalogResult<Vec<Item>> {
        // rowid follows insertion order, which is the list contract.
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY rowid ASC;"
        ))?;

        let mut rows = stmt.query([owner.as_str()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(self.conn, row)?);
        }
        Ok(items)
    }

    fn bin_exists(&self, owner: &OwnerId, id: BinId) -> CatalogResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM bins WHERE uuid = ?1 AND owner_id = ?2
            );",
            params![id.to_string(), owner.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn category_exists(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM categories WHERE uuid = ?1 AND owner_id = ?2
            );",
            params![id.to_string(), owner.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl SqliteItemRepository<'_> {
    fn delete_item_once(&self, owner: &OwnerId, id: ItemId) -> CatalogResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM items WHERE uuid = ?1 AND owner_id = ?2;",
                params![id.to_string(), owner.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(CatalogError::not_found("item", id));
        }

        tx.execute(
            "DELETE FROM item_tags WHERE item_uuid = ?1;",
            [id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM items WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }
}

/// Loads the tags attached to one item, ordered case-insensitively by name.
pub(crate) fn load_tags_for_item(conn: &Connection, item_uuid: &str) -> CatalogResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.uuid, t.name
         FROM item_tags it
         INNER JOIN tags t ON t.uuid = it.tag_uuid
         WHERE it.item_uuid = ?1
         ORDER BY t.name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([item_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get(0)?;
        tags.push(Tag {
            id: parse_uuid(&uuid_text, "tags.uuid")?,
            name: row.get(1)?,
        });
    }
    Ok(tags)
}

fn load_required_item(conn: &Connection, owner: &OwnerId, id: ItemId) -> CatalogResult<Item> {
    let mut stmt = conn.prepare(&format!(
        "{ITEM_SELECT_SQL}
         WHERE uuid = ?1
           AND owner_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
    if let Some(row) = rows.next()? {
        return parse_item_row(conn, row);
    }
    Err(CatalogError::not_found("item", id))
}

fn parse_item_row(conn: &Connection, row: &Row<'_>) -> CatalogResult<Item> {
    let uuid_text: String = row.get("uuid")?;
    let condition = match row.get::<_, Option<String>>("condition")? {
        Some(value) => Some(parse_condition(&value).ok_or_else(|| {
            CatalogError::InvalidData(format!("invalid condition `{value}` in items.condition"))
        })?),
        None => None,
    };
    let bin_id = row
        .get::<_, Option<String>>("bin_uuid")?
        .map(|value| parse_uuid(&value, "items.bin_uuid"))
        .transpose()?;
    let category_id = row
        .get::<_, Option<String>>("category_uuid")?
        .map(|value| parse_uuid(&value, "items.category_uuid"))
        .transpose()?;
    let tags = load_tags_for_item(conn, &uuid_text)?;

    Ok(Item {
        id: parse_uuid(&uuid_text, "items.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        condition,
        notes: row.get("notes")?,
        bin_id,
        category_id,
        photo_ref: row
            .get::<_, Option<String>>("photo_ref")?
            .map(AssetKey::new),
        tags,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn condition_to_db(condition: Condition) -> &'static str {
    match condition {
        Condition::Good => "good",
        Condition::Damaged => "damaged",
        Condition::Broken => "broken",
    }
}

pub(crate) fn parse_condition(value: &str) -> Option<Condition> {
    match value {
        "good" => Some(Condition::Good),
        "damaged" => Some(Condition::Damaged),
        "broken" => Some(Condition::Broken),
        _ => None,
    }
}
