use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::similarity::tokenize::StopWordList;

/// How many recommendations to show when nothing else is configured.
pub const DEFAULT_TOP_K: usize = 4;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command
/// line flags override these values in main.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory searched for articles.csv / data.csv
    pub data_dir: PathBuf,
    /// Explicit data file; skips discovery when set
    pub data_file: Option<PathBuf>,
    /// SQLite file holding the cached similarity matrix
    pub db_path: String,
    /// Number of recommendations per article
    pub top_k: usize,
    pub stop_words: StopWordList,
    /// When false the matrix is always rebuilt and never persisted
    pub use_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            data_file: None,
            db_path: "./readnext.db".to_string(),
            top_k: DEFAULT_TOP_K,
            stop_words: StopWordList::default(),
            use_cache: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset keys fall back to defaults;
    /// set but unparseable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let top_k = match non_empty("READNEXT_TOP_K") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("READNEXT_TOP_K must be a non-negative integer, got {raw:?}"))?,
            None => defaults.top_k,
        };

        let stop_words = match non_empty("READNEXT_STOP_WORDS") {
            Some(raw) => raw
                .parse::<StopWordList>()
                .map_err(anyhow::Error::msg)
                .context("Invalid READNEXT_STOP_WORDS")?,
            None => defaults.stop_words,
        };

        Ok(Self {
            data_dir: non_empty("READNEXT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            data_file: non_empty("READNEXT_DATA_FILE").map(PathBuf::from),
            db_path: non_empty("READNEXT_DB_PATH").unwrap_or(defaults.db_path),
            top_k,
            stop_words,
            use_cache: non_empty("READNEXT_NO_CACHE").is_none(),
        })
    }
}
