// System status display: data source, corpus size, cache state.

use anyhow::Result;
use tracing::warn;

use crate::config::Config;
use crate::corpus::loader;
use crate::db::{self, queries};
use crate::similarity::tfidf::TfIdfVectorizer;
use crate::similarity::traits::DocumentVectorizer;

/// Display system status to the terminal. Never builds a matrix.
pub fn show(config: &Config) -> Result<()> {
    let loaded = match loader::resolve(config.data_file.as_deref(), &config.data_dir) {
        Ok(path) => {
            let loaded = loader::load(&path)?;
            let file_size = std::fs::metadata(&path)
                .map(|m| format_bytes(m.len()))
                .unwrap_or_else(|_| "unknown".to_string());
            println!(
                "Data file: {} ({}, {})",
                path.display(),
                file_size,
                loaded.encoding
            );
            println!("Articles: {}", loaded.corpus.len());
            Some(loaded)
        }
        Err(e) => {
            println!("Data file: {e}");
            None
        }
    };

    let vectorizer = TfIdfVectorizer::new(config.stop_words);
    println!("Stop words: {}", config.stop_words);
    println!("Recommendations per article: {}", config.top_k);

    if !config.use_cache {
        println!("Cache: disabled");
        return Ok(());
    }

    match cache_status(&config.db_path) {
        CacheStatus::Missing => println!("Cache: {} (not created yet)", config.db_path),
        CacheStatus::Empty => println!("Cache: {} (empty)", config.db_path),
        CacheStatus::Unreadable(reason) => {
            println!("Cache: {} (unreadable: {reason})", config.db_path);
            println!("  Ignored: matrices are rebuilt in memory until the file is removed");
        }
        CacheStatus::Stored {
            fingerprint,
            doc_count,
            settings,
            built_at,
        } => {
            println!(
                "Cache: {} ({} articles, built {}, {})",
                config.db_path,
                doc_count,
                built_at,
                settings.as_deref().unwrap_or("unknown settings")
            );
            if let Some(loaded) = &loaded {
                let current = loaded.corpus.fingerprint(&vectorizer.settings_label());
                if current == fingerprint {
                    println!("  Up to date with the data file");
                } else {
                    println!("  Stale: will be rebuilt on next use");
                }
            }
        }
    }

    Ok(())
}

/// What the cache file holds, read without creating or modifying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    Missing,
    Empty,
    Unreadable(String),
    Stored {
        fingerprint: String,
        doc_count: usize,
        settings: Option<String>,
        built_at: String,
    },
}

pub fn cache_status(db_path: &str) -> CacheStatus {
    let conn = match db::open_existing(db_path) {
        Ok(Some(conn)) => conn,
        Ok(None) => return CacheStatus::Missing,
        Err(e) => return CacheStatus::Unreadable(format!("{e:#}")),
    };

    match queries::get_cache_info(&conn) {
        Ok(Some((fingerprint, doc_count, settings, built_at))) => CacheStatus::Stored {
            fingerprint,
            doc_count,
            settings,
            built_at,
        },
        Ok(None) => CacheStatus::Empty,
        Err(e) => {
            warn!(error = %e, path = db_path, "Similarity cache is unreadable");
            CacheStatus::Unreadable(format!("{e:#}"))
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::SimilarityMatrix;

    #[test]
    fn test_cache_status_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.db");
        assert_eq!(cache_status(path.to_str().unwrap()), CacheStatus::Missing);
    }

    #[test]
    fn test_cache_status_junk_file_is_unreadable_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.db");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();

        let status = cache_status(path.to_str().unwrap());
        assert!(matches!(status, CacheStatus::Unreadable(_)), "{status:?}");
        assert_eq!(std::fs::read(&path).unwrap(), vec![b'x'; 4096]);
    }

    #[test]
    fn test_cache_status_reads_stored_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let path = path.to_str().unwrap();
        {
            let conn = db::initialize(path).unwrap();
            let m = SimilarityMatrix::from_values(1, vec![1.0]).unwrap();
            queries::save_matrix(&conn, "fp", "tfidf", &m).unwrap();
        }

        match cache_status(path) {
            CacheStatus::Stored {
                fingerprint,
                doc_count,
                settings,
                ..
            } => {
                assert_eq!(fingerprint, "fp");
                assert_eq!(doc_count, 1);
                assert_eq!(settings.as_deref(), Some("tfidf"));
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
    }
}
