// Database layer: SQLite storage for the cached similarity matrix.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever READNEXT_DB_PATH points
// (defaults to ./readnext.db).

pub mod models;
pub mod queries;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Open (or create) the database and create its tables.
pub fn initialize(db_path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database without creating or migrating it. `Ok(None)`
/// when the file does not exist yet.
pub fn open_existing(db_path: &str) -> Result<Option<Connection>> {
    if !Path::new(db_path).exists() {
        return Ok(None);
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database at {}", db_path))?;

    Ok(Some(conn))
}
