// TF-IDF vectorization.
//
// Weight of a term in a document is its raw count times the smoothed inverse
// document frequency:
//
//   idf(t) = ln((1 + n) / (1 + df(t))) + 1
//
// where n is the number of documents and df(t) the number of documents that
// contain t. Each document vector is then scaled to unit length, so a dot
// product between two vectors is already their cosine similarity. Documents
// with no surviving tokens keep an all-zero vector.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::error::RankError;
use super::tokenize::{tokenize, StopWordList};
use super::traits::{DocumentVectorizer, Vectorized};

/// Sorted list of every term seen in the corpus. A term's position is its
/// column index in the term vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Sparse weighted vector over the vocabulary: `(term index, weight)` pairs
/// in ascending term order, zero weights omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    entries: Vec<(usize, f64)>,
}

impl TermVector {
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(_, w)| w != 0.0);
        entries.sort_by_key(|&(idx, _)| idx);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Weight of a term, 0.0 when the document does not contain it.
    pub fn weight(&self, term: usize) -> f64 {
        self.entries
            .binary_search_by_key(&term, |&(idx, _)| idx)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dot product by merging the two sorted entry lists.
    pub fn dot(&self, other: &TermVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalized(self) -> Self {
        let norm = self.norm();
        if norm == 0.0 {
            return self;
        }
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(idx, w)| (idx, w / norm))
                .collect(),
        }
    }
}

/// Smoothed inverse document frequency.
pub fn smooth_idf(doc_count: usize, doc_freq: usize) -> f64 {
    ((1 + doc_count) as f64 / (1 + doc_freq) as f64).ln() + 1.0
}

/// TF-IDF vectorizer, the default `DocumentVectorizer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfVectorizer {
    pub stop_words: StopWordList,
}

impl TfIdfVectorizer {
    pub fn new(stop_words: StopWordList) -> Self {
        Self { stop_words }
    }
}

impl DocumentVectorizer for TfIdfVectorizer {
    fn vectorize(&self, bodies: &[&str]) -> Result<Vectorized, RankError> {
        if bodies.is_empty() {
            return Err(RankError::EmptyCorpus);
        }

        let tokenized: Vec<Vec<String>> = bodies
            .iter()
            .map(|body| tokenize(body, self.stop_words))
            .collect();

        // Term counts per document, keyed in sorted term order
        let counts: Vec<BTreeMap<&str, u32>> = tokenized
            .iter()
            .map(|tokens| {
                let mut c = BTreeMap::new();
                for t in tokens {
                    *c.entry(t.as_str()).or_insert(0) += 1;
                }
                c
            })
            .collect();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for c in &counts {
            for term in c.keys() {
                *doc_freq.entry(*term).or_insert(0) += 1;
            }
        }

        let column: HashMap<&str, usize> = doc_freq
            .keys()
            .enumerate()
            .map(|(idx, term)| (*term, idx))
            .collect();
        let idf: Vec<f64> = doc_freq
            .values()
            .map(|&df| smooth_idf(bodies.len(), df))
            .collect();

        let vectors: Vec<TermVector> = counts
            .iter()
            .map(|c| {
                let entries = c
                    .iter()
                    .map(|(term, &count)| {
                        let idx = column[term];
                        (idx, count as f64 * idf[idx])
                    })
                    .collect();
                TermVector::from_entries(entries).normalized()
            })
            .collect();

        let vocabulary = Vocabulary {
            terms: doc_freq.keys().map(|t| t.to_string()).collect(),
        };

        debug!(
            documents = bodies.len(),
            vocabulary = vocabulary.len(),
            stop_words = %self.stop_words,
            "Vectorized corpus"
        );

        Ok(Vectorized {
            vocabulary,
            vectors,
        })
    }

    fn settings_label(&self) -> String {
        format!("tfidf-smooth-l2/stop={}", self.stop_words)
    }
}
