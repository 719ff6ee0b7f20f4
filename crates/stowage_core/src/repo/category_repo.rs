//! Category repository contract and SQLite implementation.
//!
//! # Invariants
//! - All queries are constrained to the caller's owner scope.
//! - A category with live bin/item references cannot be deleted.

use crate::identity::OwnerId;
use crate::model::category::{Category, CategoryId, CategoryPatch, NewCategory};
use crate::model::Patch;
use crate::repo::{
    ensure_catalog_connection_ready, parse_uuid, with_transient_retry, CatalogError, CatalogResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior};
use uuid::Uuid;

const CATEGORY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    created_at,
    updated_at
FROM categories";

/// Repository interface for category CRUD operations.
pub trait CategoryRepository {
    fn create_category(&self, owner: &OwnerId, new: &NewCategory) -> CatalogResult<Category>;
    fn get_category(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<Option<Category>>;
    fn update_category(
        &self,
        owner: &OwnerId,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> CatalogResult<Category>;
    /// Deletes one category, failing with a conflict while any bin or item
    /// of the owner still references it.
    fn delete_category(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<()>;
    /// Lists the owner's categories in creation order.
    fn list_categories(&self, owner: &OwnerId) -> CatalogResult<Vec<Category>>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, owner: &OwnerId, new: &NewCategory) -> CatalogResult<Category> {
        let name = new.validate()?;
        let id = Uuid::new_v4();
        with_transient_retry(|| {
            self.conn.execute(
                "INSERT INTO categories (uuid, owner_id, name, description)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    id.to_string(),
                    owner.as_str(),
                    name.as_str(),
                    new.description.as_deref(),
                ],
            )?;
            Ok(())
        })?;
        load_required_category(self.conn, owner, id)
    }

    fn get_category(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<Option<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             WHERE uuid = ?1
               AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn update_category(
        &self,
        owner: &OwnerId,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> CatalogResult<Category> {
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
        sets.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!(
            "UPDATE categories SET {} WHERE uuid = ? AND owner_id = ?;",
            sets.join(", ")
        );
        bind_values.push(Value::Text(id.to_string()));
        bind_values.push(Value::Text(owner.as_str().to_string()));

        let changed = with_transient_retry(|| {
            Ok(self.conn.execute(&sql, params_from_iter(bind_values.clone()))?)
        })?;
        if changed == 0 {
            return Err(CatalogError::not_found("category", id));
        }

        load_required_category(self.conn, owner, id)
    }

    fn delete_category(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<()> {
        with_transient_retry(|| self.delete_category_once(owner, id))
    }

    fn list_categories(&self, owner: &OwnerId) -> CatalogResult<Vec<Category>> {
        // rowid follows insertion order, which is the list contract.
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY rowid ASC;"
        ))?;

        let mut rows = stmt.query([owner.as_str()])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }
}

impl SqliteCategoryRepository<'_> {
    fn delete_category_once(&self, owner: &OwnerId, id: CategoryId) -> CatalogResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM categories WHERE uuid = ?1 AND owner_id = ?2;",
                params![id.to_string(), owner.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(CatalogError::not_found("category", id));
        }

        let bin_refs: i64 = tx.query_row(
            "SELECT COUNT(*) FROM bins WHERE category_uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
            |row| row.get(0),
        )?;
        let item_refs: i64 = tx.query_row(
            "SELECT COUNT(*) FROM items WHERE category_uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
            |row| row.get(0),
        )?;
        if bin_refs + item_refs > 0 {
            return Err(CatalogError::Conflict {
                entity: "category",
                id,
                message: format!(
                    "still referenced by {bin_refs} bin(s) and {item_refs} item(s)"
                ),
            });
        }

        tx.execute(
            "DELETE FROM categories WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn load_required_category(
    conn: &Connection,
    owner: &OwnerId,
    id: CategoryId,
) -> CatalogResult<Category> {
    let mut stmt = conn.prepare(&format!(
        "{CATEGORY_SELECT_SQL}
         WHERE uuid = ?1
           AND owner_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), owner.as_str()])?;
    if let Some(row) = rows.next()? {
        return parse_category_row(row);
    }
    Err(CatalogError::not_found("category", id))
}

fn parse_category_row(row: &Row<'_>) -> CatalogResult<Category> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Category {
        id: parse_uuid(&uuid_text, "categories.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
