//! `SQLite` schema definitions for handover.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the handover table.
///
/// Column names match [`Field::key`](crate::record::Field::key).
pub const CREATE_HANDOVER_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS handover (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT,
    employee_name TEXT,
    national_id TEXT,
    job_title TEXT,
    department TEXT,
    asset_receipt_date TEXT,
    return_date TEXT,
    notes TEXT,
    item_name TEXT,
    model TEXT,
    serial TEXT,
    color TEXT,
    condition TEXT,
    accessories TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_HANDOVER_TABLE, CREATE_METADATA_TABLE];
