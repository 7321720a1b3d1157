// Data source loader: finds the article file and turns it into a Corpus.
//
// The file is a CSV with at least a "Title" and an "Article" column. Header
// names are trimmed before matching, extra columns are ignored. Text is read
// as UTF-8; if that fails the bytes are decoded as Latin-1, which maps every
// byte to the code point of the same value and so never fails.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::{Corpus, Document};

/// File names tried, in order, when no explicit data file is given.
pub const CANDIDATE_FILES: [&str; 2] = ["articles.csv", "data.csv"];

pub const TITLE_COLUMN: &str = "Title";
pub const BODY_COLUMN: &str = "Article";

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("no article data file found (looked for {})", display_paths(.searched))]
    DataSourceNotFound { searched: Vec<PathBuf> },

    #[error("{path:?} has no {column:?} column (found: {found})")]
    MissingColumn {
        path: PathBuf,
        column: &'static str,
        found: String,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Encoding the data file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => f.write_str("UTF-8"),
            TextEncoding::Latin1 => f.write_str("Latin-1"),
        }
    }
}

/// A corpus together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    pub path: PathBuf,
    pub encoding: TextEncoding,
    pub corpus: Corpus,
}

/// Find the first candidate data file in a directory.
pub fn discover(data_dir: &Path) -> Result<PathBuf, CorpusError> {
    let searched: Vec<PathBuf> = CANDIDATE_FILES.iter().map(|f| data_dir.join(f)).collect();
    match searched.iter().find(|p| p.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(CorpusError::DataSourceNotFound { searched }),
    }
}

/// Resolve the data file: an explicit path must exist, otherwise discover.
pub fn resolve(data_file: Option<&Path>, data_dir: &Path) -> Result<PathBuf, CorpusError> {
    match data_file {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(CorpusError::DataSourceNotFound {
            searched: vec![path.to_path_buf()],
        }),
        None => discover(data_dir),
    }
}

/// Decode raw file bytes, falling back to Latin-1 when they are not UTF-8.
pub fn decode(bytes: Vec<u8>) -> (String, TextEncoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, TextEncoding::Utf8),
        Err(e) => {
            let text = e.into_bytes().iter().map(|&b| b as char).collect();
            (text, TextEncoding::Latin1)
        }
    }
}

/// Parse CSV text into a corpus.
///
/// A record shorter than the header has no value for the article column and
/// yields a document with an absent body. An empty field is an empty body.
/// `path` is only used in error messages.
pub fn parse(text: &str, path: &Path) -> Result<Corpus, CorpusError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let csv_err = |source: csv::Error| CorpusError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CorpusError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
                found: headers.join(", "),
            })
    };
    let title_idx = column(TITLE_COLUMN)?;
    let body_idx = column(BODY_COLUMN)?;

    let mut documents = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        documents.push(Document {
            title: record.get(title_idx).unwrap_or_default().to_string(),
            body: record.get(body_idx).map(str::to_string),
        });
    }

    Ok(Corpus::new(documents))
}

/// Read, decode and parse a data file.
pub fn load(path: &Path) -> Result<LoadedCorpus, CorpusError> {
    let bytes = fs::read(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, encoding) = decode(bytes);
    if encoding == TextEncoding::Latin1 {
        warn!(path = %path.display(), "Data file is not valid UTF-8, decoded as Latin-1");
    }

    let corpus = parse(&text, path)?;
    info!(
        path = %path.display(),
        documents = corpus.len(),
        encoding = %encoding,
        "Loaded corpus"
    );

    Ok(LoadedCorpus {
        path: path.to_path_buf(),
        encoding,
        corpus,
    })
}
