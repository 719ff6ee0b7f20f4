//! Catalog store: repository contracts and shared persistence plumbing.
//!
//! # Responsibility
//! - Define the error model shared by every catalog layer.
//! - Own the transient-retry policy for storage failures.
//! - Verify connection readiness before any repository is handed out.
//!
//! # Invariants
//! - Every repository operation is scoped to one owner; a row owned by a
//!   different tenant is indistinguishable from an absent row.
//! - Write paths validate fields before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use uuid::Uuid;

pub mod bin_repo;
pub mod category_repo;
pub mod item_repo;
pub mod tag_repo;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Unified error for catalog persistence and invariant checks.
#[derive(Debug)]
pub enum CatalogError {
    /// Input failed a field constraint. Never retried.
    Validation(ValidationError),
    /// Referenced id is absent or owned by a different tenant. Never retried.
    NotFound { entity: &'static str, id: Uuid },
    /// A parent-bin assignment would make a bin its own ancestor.
    Cycle { bin: Uuid, parent: Uuid },
    /// A uniqueness or live-reference rule blocks the operation.
    Conflict {
        entity: &'static str,
        id: Uuid,
        message: String,
    },
    /// Underlying persistence failure. Retried once, then surfaced.
    Storage(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from an expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// True only for storage failures worth one retry (busy/locked).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _))) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Cycle { bin, parent } => write!(
                f,
                "assigning parent {parent} to bin {bin} would create a cycle"
            ),
            Self::Conflict {
                entity,
                id,
                message,
            } => write!(f, "conflict on {entity} {id}: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for CatalogError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

const TRANSIENT_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Runs a storage operation, retrying exactly once after a short backoff
/// when the first attempt fails transiently. Deterministic errors
/// (validation, not-found, cycle, conflict) pass through untouched.
pub fn with_transient_retry<T>(
    mut op: impl FnMut() -> CatalogResult<T>,
) -> CatalogResult<T> {
    match op() {
        Err(err) if err.is_transient() => {
            std::thread::sleep(TRANSIENT_RETRY_BACKOFF);
            op()
        }
        other => other,
    }
}

/// Verifies the connection is migrated and carries the catalog schema.
/// Every repository constructor funnels through this check.
pub(crate) fn ensure_catalog_connection_ready(conn: &Connection) -> CatalogResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(CatalogError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["categories", "bins", "items", "tags", "item_tags"] {
        if !table_exists(conn, table)? {
            return Err(CatalogError::MissingRequiredTable(table));
        }
    }

    for (table, column) in [
        ("categories", "owner_id"),
        ("bins", "owner_id"),
        ("bins", "parent_uuid"),
        ("items", "owner_id"),
        ("items", "bin_uuid"),
        ("tags", "owner_id"),
        ("item_tags", "tag_uuid"),
    ] {
        if !table_has_column(conn, table, column)? {
            return Err(CatalogError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> CatalogResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| CatalogError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn table_exists(conn: &Connection, table: &str) -> CatalogResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> CatalogResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
