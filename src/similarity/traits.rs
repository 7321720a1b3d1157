// Document vectorizer trait: swap-ready abstraction.
//
// The matrix builder only needs one weighted vector per document. TF-IDF is
// the default; anything that produces non-negative sparse vectors can stand
// in without touching the ranking code.

use super::error::RankError;
use super::tfidf::{TermVector, Vocabulary};

/// Output of a vectorizer run: the shared vocabulary plus one vector per
/// input document, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Vectorized {
    pub vocabulary: Vocabulary,
    pub vectors: Vec<TermVector>,
}

/// Trait for turning document bodies into weighted term vectors.
pub trait DocumentVectorizer {
    /// Vectorize every body. Fails on an empty input slice.
    fn vectorize(&self, bodies: &[&str]) -> Result<Vectorized, RankError>;

    /// Identifies the vectorizer and its settings. Part of the corpus
    /// fingerprint, so a cached matrix built with other settings is never
    /// reused.
    fn settings_label(&self) -> String;
}
