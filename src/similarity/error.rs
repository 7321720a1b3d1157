// Errors raised by the similarity ranker.
//
// These are the only failures the core computation can produce. Callers in
// the pipeline and CLI wrap them in anyhow with context; tests match on the
// variants directly.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankError {
    #[error("corpus has no documents, nothing to compare")]
    EmptyCorpus,

    #[error("document {index} ({title:?}) has no body text")]
    InvalidDocument { index: usize, title: String },

    #[error("document index {index} is out of range for a corpus of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("similarity matrix covers {matrix} documents but the corpus has {corpus}")]
    DimensionMismatch { matrix: usize, corpus: usize },

    #[error("invalid similarity matrix: {reason}")]
    InvalidMatrix { reason: String },
}
