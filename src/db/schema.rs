//! Database schema and migrations for filestash.
//!
//! Migrations are applied in order when the database is opened; the
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: file records
    r#"
-- One row per uploaded file. storage_location is the blob store's handle
-- and is never returned to API callers.
CREATE TABLE IF NOT EXISTS files (
    id                TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    path              TEXT NOT NULL DEFAULT '/',
    original_name     TEXT NOT NULL,
    storage_location  TEXT NOT NULL,
    size              INTEGER NOT NULL,
    created_at        TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];
