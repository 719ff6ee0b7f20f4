//! Bin repository contract and SQLite implementation.
//!
//! # Invariants
//! - All queries are constrained to the caller's owner scope.
//! - Bin deletion runs as one transaction: direct children reparent to the
//!   deleted bin's own parent, filed items become unfiled, then the row is
//!   removed. Items are never deleted as a side effect.
//!
//! Cycle prevention lives above this layer, in the hierarchy service; the
//! repository persists what it is given.

use crate::assets::AssetKey;
use crate::identity::OwnerId;
use crate::model::bin::{Bin, BinId, BinPatch, NewBin};
use crate::model::category::CategoryId;
use crate::model::Patch;
use crate::repo::{
    ensure_catalog_connection_ready, parse_uuid, with_transient_retry, CatalogError, CatalogResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior};
use uuid::Uuid;

const BIN_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    location,
    category_uuid,
    parent_uuid,
    photo_ref,
    created_at,
    updated_at
FROM bins";

/// Repository interface for bin CRUD and hierarchy lookups.
pub trait BinRepository {
    fn create_bin(&self, owner: &OwnerId, new: &NewBin) -> CatalogResult<Bin>;
    fn get_bin(&self, owner: &OwnerId, id: BinId) -> CatalogResult<Option<Bin>>;
    fn update_bin(&self, owner: &OwnerId, id: BinId, patch: &BinPatch) -> CatalogResult<Bin>;
    /// Deletes one bin with the reparent/unfile cascade.
    fn delete_bin(&self, owner: &OwnerId, id: BinId) -> CatalogResult<()>;
    /// Lists the owner's bins in creation order.
    fn list_bins(&self, owner: &OwnerId) -> CatalogResult<Vec<Bin>>;
    /// Number of bins the owner currently has. Bounds ancestor walks.
    fn count_bins(&self, owner: &OwnerId) -> CatalogResult<u64>;
    /// Owner-scoped existence check for a category reference.
    fn category_exists(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<bool>;
}

/// SQLite-backed bin repository.
pub struct SqliteBinRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBinRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BinRepository for SqliteBinRepository<'_> {
    fn create_bin(&self, owner: &OwnerId, new: &NewBin) -> CatalogResult<Bin> {
        let name = new.validate()?;
        let id = Uuid::new_v4();
        with_transient_retry(|| {
            self.conn.execute(
                "INSERT INTO bins (
                    uuid,
                    owner_id,
                    name,
                    location,
                    category_uuid,
                    parent_uuid,
                    photo_ref
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    id.to_string(),
                    owner.as_str(),
                    name.as_str(),
                    new.location.as_deref(),
                    new.category_id.map(|value| value.to_string()),
                    new.parent_id.map(|value| value.to_string()),
                    new.photo_ref.as_ref().map(|key| key.as_str().to_string()),
                ],
            )?;
            Ok(())
        })?;
        load_required_bin(self.conn, owner, id)
    }

    fn get_bin(&self, owner: &OwnerId, id: BinId) -> CatalogResult<Option<Bin>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BIN_SELECT_SQL}
             WHERE uuid = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_bin_row(row)?));
        }
        Ok(None)
    }

    fn update_bin(&self, owner: &OwnerId, id: BinId, patch: &BinPatch) -> CatalogResult<Bin> {
        let name = patch.validate()?;

        let mut sets: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = name {
            sets.push("name = ?");
            bind_values.push(Value::Text(name));
        }
        match &patch.location {
            Patch::Keep => {}
            Patch::Set(location) => {
                sets.push("location = ?");
                bind_values.push(Value::Text(location.clone()));
            }
            Patch::Clear => sets.push("location = NULL"),
        }
        match &patch.category_id {
            Patch::Keep => {}
            Patch::Set(category_id) => {
                sets.push("category_uuid = ?");
                bind_values.push(Value::Text(category_id.to_string()));
            }
            Patch::Clear => sets.push("category_uuid = NULL"),
        }
        match &patch.parent_id {
            Patch::Keep => {}
            Patch::Set(parent_id) => {
                sets.push("parent_uuid = ?");
                bind_values.push(Value::Text(parent_id.to_string()));
            }
            Patch::Clear => sets.push("parent_uuid = NULL"),
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
            "UPDATE bins SET {} WHERE uuid = ? AND owner_id = ?;",
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
            return Err(CatalogError::not_found("bin", id));
        }

        load_required_bin(self.conn, owner, id)
    }

    fn delete_bin(&self, owner: &OwnerId, id: BinId) -> CatalogResult<()> {
        with_transient_retry(|| self.delete_bin_once(owner, id))
    }

    fn list_bins(&self, owner: &OwnerId) -> CatalogResult<Vec<Bin>> {
        // rowid follows insertion order, which is the list contract.
        let mut stmt = self.conn.prepare(&format!(
            "{BIN_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY rowid ASC;"
        ))?;

        let mut rows = stmt.query([owner.as_str()])?;
        let mut bins = Vec::new();
        while let Some(row) = rows.next()? {
            bins.push(parse_bin_row(row)?);
        }
        Ok(bins)
    }

    fn count_bins(&self, owner: &OwnerId) -> CatalogResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM bins WHERE owner_id = ?1;",
            [owner.as_str()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
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

impl SqliteBinRepository<'_> {
    fn delete_bin_once(&self, owner: &OwnerId, id: BinId) -> CatalogResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let parent_uuid: Option<String> = tx
            .query_row(
                "SELECT parent_uuid FROM bins WHERE uuid = ?1 AND owner_id = ?2;",
                params![id.to_string(), owner.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(CatalogError::NotFound { entity: "bin", id })?;

        // Children inherit the deleted bin's own parent, preserving the
        // shape of the rest of the subtree.
        tx.execute(
            "UPDATE bins
             SET parent_uuid = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE parent_uuid = ?1
               AND owner_id = ?2;",
            params![id.to_string(), owner.as_str(), parent_uuid.as_deref()],
        )?;

        tx.execute(
            "UPDATE items
             SET bin_uuid = NULL,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE bin_uuid = ?1
               AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;

        tx.execute(
            "DELETE FROM bins WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }
}

fn load_required_bin(conn: &Connection, owner: &OwnerId, id: BinId) -> CatalogResult<Bin> {
    let mut stmt = conn.prepare(&format!(
        "{BIN_SELECT_SQL}
         WHERE uuid = ?1
           AND owner_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
    if let Some(row) = rows.next()? {
        return parse_bin_row(row);
    }
    Err(CatalogError::not_found("bin", id))
}

fn parse_bin_row(row: &Row<'_>) -> CatalogResult<Bin> {
    let uuid_text: String = row.get("uuid")?;
    let category_id = row
        .get::<_, Option<String>>("category_uuid")?
        .map(|value| parse_uuid(&value, "bins.category_uuid"))
        .transpose()?;
    let parent_id = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "bins.parent_uuid"))
        .transpose()?;

    Ok(Bin {
        id: parse_uuid(&uuid_text, "bins.uuid")?,
        name: row.get("name")?,
        location: row.get("location")?,
        category_id,
        parent_id,
        photo_ref: row
            .get::<_, Option<String>>("photo_ref")?
            .map(AssetKey::new),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
