//! Tag repository contract and SQLite implementation.
//!
//! # Invariants
//! - Tag identity is the case-folded trimmed name, unique per owner; the
//!   stored display form keeps the casing used at creation.
//! - `set_item_tags` applies the symmetric difference against the current
//!   join rows in one transaction and is idempotent.
//! - A tag with zero remaining joins is retained; only an explicit delete
//!   removes it, and only while unreferenced.

use crate::identity::OwnerId;
use crate::model::item::ItemId;
use crate::model::tag::{Tag, TagId};
use crate::repo::item_repo::load_tags_for_item;
use crate::repo::{
    ensure_catalog_connection_ready, parse_uuid, with_transient_retry, CatalogError, CatalogResult,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::HashSet;
use uuid::Uuid;

/// Repository interface for the tag vocabulary and the item/tag join.
pub trait TagRepository {
    /// Reuses the owner's tag with the same case-folded name or creates a
    /// new one preserving the given display form. Input must be trimmed and
    /// non-blank (the service layer normalizes).
    fn resolve_or_create_tag(&self, owner: &OwnerId, display: &str) -> CatalogResult<Tag>;
    /// Replaces the item's desired tag set. `displays` must be normalized:
    /// trimmed, non-blank, case-fold deduplicated.
    fn set_item_tags(
        &self,
        owner: &OwnerId,
        item: ItemId,
        displays: &[String],
    ) -> CatalogResult<Vec<Tag>>;
    /// Lists the owner's tags ordered case-insensitively by name.
    fn list_tags(&self, owner: &OwnerId) -> CatalogResult<Vec<Tag>>;
    /// Deletes one tag, failing with a conflict while any item still
    /// carries it.
    fn delete_tag(&self, owner: &OwnerId, id: TagId) -> CatalogResult<()>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn resolve_or_create_tag(&self, owner: &OwnerId, display: &str) -> CatalogResult<Tag> {
        with_transient_retry(|| resolve_or_create_in(self.conn, owner, display))
    }

    fn set_item_tags(
        &self,
        owner: &OwnerId,
        item: ItemId,
        displays: &[String],
    ) -> CatalogResult<Vec<Tag>> {
        with_transient_retry(|| self.set_item_tags_once(owner, item, displays))
    }

    fn list_tags(&self, owner: &OwnerId) -> CatalogResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name
             FROM tags
             WHERE owner_id = ?1
             ORDER BY name COLLATE NOCASE ASC;",
        )?;
        let mut rows = stmt.query([owner.as_str()])?;
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

    fn delete_tag(&self, owner: &OwnerId, id: TagId) -> CatalogResult<()> {
        with_transient_retry(|| self.delete_tag_once(owner, id))
    }
}

impl SqliteTagRepository<'_> {
    fn set_item_tags_once(
        &self,
        owner: &OwnerId,
        item: ItemId,
        displays: &[String],
    ) -> CatalogResult<Vec<Tag>> {
        let item_uuid = item.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM items WHERE uuid = ?1 AND owner_id = ?2;",
                params![item_uuid.as_str(), owner.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(CatalogError::not_found("item", item));
        }

        let mut desired_ids: HashSet<TagId> = HashSet::new();
        for display in displays {
            let tag = resolve_or_create_in(&tx, owner, display)?;
            desired_ids.insert(tag.id);
        }

        let current_ids = {
            let mut stmt =
                tx.prepare("SELECT tag_uuid FROM item_tags WHERE item_uuid = ?1;")?;
            let mut rows = stmt.query([item_uuid.as_str()])?;
            let mut ids: HashSet<TagId> = HashSet::new();
            while let Some(row) = rows.next()? {
                let value: String = row.get(0)?;
                ids.insert(parse_uuid(&value, "item_tags.tag_uuid")?);
            }
            ids
        };

        for tag_id in desired_ids.difference(&current_ids) {
            tx.execute(
                "INSERT INTO item_tags (item_uuid, tag_uuid) VALUES (?1, ?2);",
                params![item_uuid.as_str(), tag_id.to_string()],
            )?;
        }
        for tag_id in current_ids.difference(&desired_ids) {
            tx.execute(
                "DELETE FROM item_tags WHERE item_uuid = ?1 AND tag_uuid = ?2;",
                params![item_uuid.as_str(), tag_id.to_string()],
            )?;
        }

        tx.execute(
            "UPDATE items
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND owner_id = ?2;",
            params![item_uuid.as_str(), owner.as_str()],
        )?;

        let final_tags = load_tags_for_item(&tx, item_uuid.as_str())?;
        tx.commit()?;
        Ok(final_tags)
    }

    fn delete_tag_once(&self, owner: &OwnerId, id: TagId) -> CatalogResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM tags WHERE uuid = ?1 AND owner_id = ?2;",
                params![id.to_string(), owner.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(CatalogError::not_found("tag", id));
        }

        let live_refs: i64 = tx.query_row(
            "SELECT COUNT(*) FROM item_tags WHERE tag_uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        if live_refs > 0 {
            return Err(CatalogError::Conflict {
                entity: "tag",
                id,
                message: format!("still attached to {live_refs} item(s)"),
            });
        }

        tx.execute(
            "DELETE FROM tags WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn resolve_or_create_in(conn: &Connection, owner: &OwnerId, display: &str) -> CatalogResult<Tag> {
    let existing: Option<(String, String)> = conn
        .query_row(
            "SELECT uuid, name
             FROM tags
             WHERE owner_id = ?1
               AND name = ?2 COLLATE NOCASE;",
            params![owner.as_str(), display],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    if let Some((uuid_text, name)) = existing {
        return Ok(Tag {
            id: parse_uuid(&uuid_text, "tags.uuid")?,
            name,
        });
    }

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO tags (uuid, owner_id, name) VALUES (?1, ?2, ?3);",
        params![id.to_string(), owner.as_str(), display],
    )?;
    Ok(Tag {
        id,
        name: display.to_string(),
    })
}
