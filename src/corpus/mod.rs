// Corpus: the ordered collection of articles under analysis.
//
// A document's identifier is its position in the corpus. The ranker and the
// cached matrix both rely on that order, so it is never changed after load.

pub mod loader;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    /// Article text. `None` means the source had no value at all, which the
    /// ranker rejects; `Some("")` is an empty but valid article.
    pub body: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Some(body.into()),
        }
    }

    pub fn without_body(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: None,
        }
    }

    /// Body for display, empty when absent.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// Result of looking up a document by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleMatch {
    Found(usize),
    /// Several titles contain the query; their indices in corpus order
    Ambiguous(Vec<usize>),
    NotFound,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Find a document by title.
    ///
    /// An exact match wins (first occurrence if titles repeat). Otherwise a
    /// case-insensitive substring match is accepted when it is unique.
    pub fn find_title(&self, query: &str) -> TitleMatch {
        let query = query.trim();
        if query.is_empty() {
            return TitleMatch::NotFound;
        }

        if let Some(idx) = self.documents.iter().position(|d| d.title == query) {
            return TitleMatch::Found(idx);
        }

        let needle = query.to_lowercase();
        let hits: Vec<usize> = self
            .documents
            .iter()
            .enumerate()
            .filter(|(_, d)| d.title.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();

        match hits.len() {
            0 => TitleMatch::NotFound,
            1 => TitleMatch::Found(hits[0]),
            _ => TitleMatch::Ambiguous(hits),
        }
    }

    /// Content fingerprint: hex SHA-256 over the vectorizer settings and
    /// every title and body, in order.
    ///
    /// Fields are length-prefixed so that moving text between a title and a
    /// body changes the digest, and an absent body hashes differently from an
    /// empty one.
    pub fn fingerprint(&self, settings: &str) -> String {
        let mut hasher = Sha256::new();
        hash_field(&mut hasher, settings);
        hasher.update((self.documents.len() as u64).to_le_bytes());
        for doc in &self.documents {
            hash_field(&mut hasher, &doc.title);
            match &doc.body {
                Some(body) => {
                    hasher.update([1u8]);
                    hash_field(&mut hasher, body);
                }
                None => hasher.update([0u8]),
            }
        }
        hex::encode(hasher.finalize())
    }
}

fn hash_field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

impl From<Vec<Document>> for Corpus {
    fn from(documents: Vec<Document>) -> Self {
        Self::new(documents)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
