// Startup pipeline: load the corpus and get a similarity index for it.
//
// Steps: resolve the data file, load the corpus, then either reuse the
// cached matrix (fingerprint must match and the matrix must validate) or
// build a new one and save it. Any cache problem is logged and answered by
// rebuilding; the cache can never make startup fail.

use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::config::Config;
use crate::corpus::loader::{self, TextEncoding};
use crate::corpus::Corpus;
use crate::db::{self, queries};
use crate::similarity::tfidf::TfIdfVectorizer;
use crate::similarity::traits::DocumentVectorizer;
use crate::similarity::{IndexSnapshot, SimilarityIndex, SimilarityMatrix};

/// Where the similarity matrix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSource {
    Cache,
    Built,
}

/// Everything the CLI needs after startup.
pub struct Prepared {
    pub data_path: PathBuf,
    pub encoding: TextEncoding,
    pub index: SimilarityIndex,
    pub source: MatrixSource,
}

/// Load the configured corpus and produce its similarity index.
///
/// `force_rebuild` ignores any cached matrix (the rebuilt one is still
/// saved when caching is enabled).
pub fn run(config: &Config, force_rebuild: bool) -> Result<Prepared> {
    let data_path = loader::resolve(config.data_file.as_deref(), &config.data_dir)?;
    let loaded = loader::load(&data_path)?;

    let vectorizer = TfIdfVectorizer::new(config.stop_words);

    let conn = if config.use_cache {
        match db::initialize(&config.db_path) {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!(error = %e, path = %config.db_path, "Similarity cache unavailable, building without it");
                None
            }
        }
    } else {
        None
    };

    let (index, source) =
        resolve_index(loaded.corpus, &vectorizer, conn.as_ref(), force_rebuild)?;

    Ok(Prepared {
        data_path: loaded.path,
        encoding: loaded.encoding,
        index,
        source,
    })
}

/// Reuse a matching cached matrix or build (and save) a new one.
pub fn resolve_index(
    corpus: Corpus,
    vectorizer: &dyn DocumentVectorizer,
    conn: Option<&Connection>,
    force_rebuild: bool,
) -> Result<(SimilarityIndex, MatrixSource)> {
    let settings = vectorizer.settings_label();
    let fingerprint = corpus.fingerprint(&settings);

    if let (Some(conn), false) = (conn, force_rebuild) {
        match load_cached(conn, &fingerprint, corpus.len()) {
            Ok(Some(matrix)) => {
                info!(documents = corpus.len(), "Using cached similarity matrix");
                let index = SimilarityIndex::from_parts(corpus, matrix, fingerprint)?;
                return Ok((index, MatrixSource::Cache));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable similarity cache, rebuilding");
            }
        }
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Comparing {} articles...", corpus.len()));
    let built = IndexSnapshot::build(corpus, vectorizer);
    spinner.finish_and_clear();
    let snapshot = built.context("Failed to build similarity matrix")?;

    if let Some(conn) = conn {
        if let Err(e) = queries::save_matrix(conn, &fingerprint, &settings, snapshot.matrix()) {
            warn!(error = %e, "Failed to save similarity matrix to cache");
        }
    }

    Ok((SimilarityIndex::new(snapshot), MatrixSource::Built))
}

/// Cached matrix for this exact fingerprint, or `None` when the cache is
/// empty or belongs to a different corpus.
fn load_cached(
    conn: &Connection,
    fingerprint: &str,
    doc_count: usize,
) -> Result<Option<SimilarityMatrix>> {
    let Some(cached) = queries::get_cached_matrix(conn)? else {
        return Ok(None);
    };

    if cached.fingerprint != fingerprint {
        info!("Cached similarity matrix belongs to a different corpus, rebuilding");
        return Ok(None);
    }

    let matrix = cached.matrix()?;
    if matrix.len() != doc_count {
        anyhow::bail!(
            "cached matrix covers {} documents, corpus has {}",
            matrix.len(),
            doc_count
        );
    }
    Ok(Some(matrix))
}
