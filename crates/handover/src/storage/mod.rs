//! Storage layer for handover.
//!
//! This module provides `SQLite`-based persistent storage for handover
//! records. The table is append-only: records are inserted once and read
//! back, never updated or deleted.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::{Field, HandoverFields, HandoverRecord};

/// Columns read back for a record: the identifier, every schema field in
/// order, then `created_at`.
const SELECT_COLUMNS: &str = "id, date, employee_name, national_id, job_title, department, \
     asset_receipt_date, return_date, notes, item_name, model, serial, color, condition, \
     accessories, created_at";

/// Insert statement; placeholders follow [`Field::ALL`] then `created_at`.
const INSERT_RECORD: &str = r"
INSERT INTO handover (
    date, employee_name, national_id, job_title, department,
    asset_receipt_date, return_date, notes,
    item_name, model, serial, color, condition, accessories,
    created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
";

/// Record store backed by a single `SQLite` file.
///
/// A `Storage` owns one connection. The web layer opens one per request and
/// drops it when the request is done.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Readers don't block the writer between requests
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new handover record.
    ///
    /// Absent fields are stored as NULL. Returns the assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create(&self, fields: &HandoverFields) -> Result<i64> {
        let created_at = Utc::now().to_rfc3339();
        let values = Field::ALL
            .into_iter()
            .map(|field| fields.get(field))
            .chain(std::iter::once(Some(created_at.as_str())));

        self.conn.execute(INSERT_RECORD, params_from_iter(values))?;

        let id = self.conn.last_insert_rowid();
        debug!(id, present = fields.present_count(), "Inserted handover record");
        Ok(id)
    }

    /// Get a record by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<HandoverRecord>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM handover WHERE id = ?1"),
                [id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(result)
    }

    /// Get a record by its identifier, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no such record exists, or an
    /// error if the database operation fails.
    pub fn require(&self, id: i64) -> Result<HandoverRecord> {
        self.get(id)?.ok_or(Error::RecordNotFound { id })
    }

    /// List every record, newest identifier first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all(&self) -> Result<Vec<HandoverRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SELECT_COLUMNS} FROM handover ORDER BY id DESC"))?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM handover", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Convert a database row to a `HandoverRecord`.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<HandoverRecord> {
        let id: i64 = row.get(0)?;

        let mut fields = HandoverFields::default();
        for (offset, field) in Field::ALL.into_iter().enumerate() {
            fields.set(field, row.get(offset + 1)?);
        }

        let created_at_str: Option<String> = row.get(Field::ALL.len() + 1)?;
        let created_at = created_at_str.and_then(|s| match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(_) => {
                warn!("Unparseable created_at {:?} on record {}", s, id);
                None
            }
        });

        Ok(HandoverRecord {
            id,
            created_at,
            fields,
        })
    }
}
