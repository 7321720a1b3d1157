// Database queries for the similarity cache.
//
// Every database interaction goes through this module, keeping SQL in one
// place.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::CachedMatrix;
use super::schema::has_cache_table;
use crate::similarity::SimilarityMatrix;

/// Store the similarity matrix (singleton, always id=1), replacing any
/// previous one.
pub fn save_matrix(
    conn: &Connection,
    fingerprint: &str,
    settings: &str,
    matrix: &SimilarityMatrix,
) -> Result<()> {
    let matrix_json = serde_json::to_string(matrix)?;
    conn.execute(
        "INSERT INTO similarity_cache (id, fingerprint, doc_count, matrix_json, settings, built_at)
         VALUES (1, ?1, ?2, ?3, ?4, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
            fingerprint = ?1,
            doc_count = ?2,
            matrix_json = ?3,
            settings = ?4,
            built_at = datetime('now')",
        params![fingerprint, matrix.len() as i64, matrix_json, settings],
    )?;
    Ok(())
}

/// Load the stored matrix row, if any.
pub fn get_cached_matrix(conn: &Connection) -> Result<Option<CachedMatrix>> {
    let mut stmt = conn.prepare(
        "SELECT fingerprint, doc_count, settings, matrix_json, built_at
         FROM similarity_cache WHERE id = 1",
    )?;
    let result = stmt
        .query_row([], |row| {
            let doc_count: i64 = row.get(1)?;
            Ok(CachedMatrix {
                fingerprint: row.get(0)?,
                doc_count: usize::try_from(doc_count).unwrap_or(0),
                settings: row.get(2)?,
                matrix_json: row.get(3)?,
                built_at: row.get(4)?,
            })
        })
        .optional()?;
    Ok(result)
}

/// Load only the metadata of the stored matrix: fingerprint, document
/// count, settings and build time. Avoids pulling the matrix itself.
/// `None` when nothing is stored, including a database without the table.
pub fn get_cache_info(
    conn: &Connection,
) -> Result<Option<(String, usize, Option<String>, String)>> {
    if !has_cache_table(conn)? {
        return Ok(None);
    }
    let mut stmt = conn.prepare(
        "SELECT fingerprint, doc_count, settings, built_at FROM similarity_cache WHERE id = 1",
    )?;
    let result = stmt
        .query_row([], |row| {
            let doc_count: i64 = row.get(1)?;
            Ok((
                row.get(0)?,
                usize::try_from(doc_count).unwrap_or(0),
                row.get(2)?,
                row.get(3)?,
            ))
        })
        .optional()?;
    Ok(result)
}

/// Delete the stored matrix. Returns true when a row was removed.
pub fn clear_cache(conn: &Connection) -> Result<bool> {
    if !has_cache_table(conn)? {
        return Ok(false);
    }
    let removed = conn.execute("DELETE FROM similarity_cache WHERE id = 1", [])?;
    Ok(removed > 0)
}
