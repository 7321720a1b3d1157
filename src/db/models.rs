// Data models for rows in the cache database.

use anyhow::{Context, Result};

use crate::similarity::SimilarityMatrix;

/// The stored similarity matrix and the metadata identifying what it was
/// built from.
#[derive(Debug, Clone)]
pub struct CachedMatrix {
    pub fingerprint: String,
    pub doc_count: usize,
    /// Vectorizer settings label; `None` for rows inserted without one
    pub settings: Option<String>,
    pub matrix_json: String,
    pub built_at: String,
}

impl CachedMatrix {
    /// Deserialize and validate the stored matrix.
    ///
    /// Fails on malformed JSON, on a matrix that breaks the shape, symmetry
    /// or range invariants, and on a size that disagrees with `doc_count`.
    pub fn matrix(&self) -> Result<SimilarityMatrix> {
        let matrix: SimilarityMatrix = serde_json::from_str(&self.matrix_json)
            .context("Cached matrix is malformed or fails validation")?;
        if matrix.len() != self.doc_count {
            anyhow::bail!(
                "Cached matrix covers {} documents but its row says {}",
                matrix.len(),
                self.doc_count
            );
        }
        Ok(matrix)
    }
}
