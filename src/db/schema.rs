// Database schema: table creation.
//
// A `schema_version` table records the schema the file was created with,
// so a later layout change can migrate old cache files in place.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version written to `schema_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Create all tables if they don't exist yet. Safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- The persisted similarity matrix for the last corpus seen
        CREATE TABLE IF NOT EXISTS similarity_cache (
            id INTEGER PRIMARY KEY CHECK (id = 1),  -- singleton row
            fingerprint TEXT NOT NULL,             -- SHA-256 of corpus + vectorizer settings
            doc_count INTEGER NOT NULL,
            matrix_json TEXT NOT NULL,
            settings TEXT,                         -- vectorizer settings label, for `status`
            built_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Whether the cache table exists. Read-only; never creates anything.
pub fn has_cache_table(conn: &Connection) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'similarity_cache'",
        [],
        |row| row.get(0),
    )?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(versions, vec![SCHEMA_VERSION]);
    }

    #[test]
    fn test_has_cache_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!has_cache_table(&conn).unwrap());
        create_tables(&conn).unwrap();
        assert!(has_cache_table(&conn).unwrap());
    }

    #[test]
    fn test_settings_column_exists() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO similarity_cache (id, fingerprint, doc_count, matrix_json, settings)
             VALUES (1, 'abc', 0, '{}', 'tfidf')",
            [],
        )
        .unwrap();

        let settings: String = conn
            .query_row("SELECT settings FROM similarity_cache WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(settings, "tfidf");
    }
}
