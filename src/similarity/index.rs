// SimilarityIndex: the explicit owner of a corpus and its matrix.
//
// The hosting process builds one of these at startup and keeps it for the
// session. Readers take an Arc snapshot and work on it without holding any
// lock. A rebuild happens only when the caller signals that the corpus
// changed; the new snapshot is computed outside the lock and swapped in
// under a short write lock, so readers holding the old snapshot are never
// disturbed. Rebuilds are serialized by a separate writer mutex.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info};

use super::error::RankError;
use super::matrix::{self, SimilarityMatrix};
use super::rank;
use super::traits::DocumentVectorizer;
use crate::corpus::Corpus;

/// Immutable pairing of a corpus with the matrix built from it.
#[derive(Debug)]
pub struct IndexSnapshot {
    corpus: Corpus,
    matrix: SimilarityMatrix,
    fingerprint: String,
}

impl IndexSnapshot {
    /// Pair a corpus with a matrix. Fails when the dimensions disagree.
    pub fn new(
        corpus: Corpus,
        matrix: SimilarityMatrix,
        fingerprint: String,
    ) -> Result<Self, RankError> {
        if matrix.len() != corpus.len() {
            return Err(RankError::DimensionMismatch {
                matrix: matrix.len(),
                corpus: corpus.len(),
            });
        }
        Ok(Self {
            corpus,
            matrix,
            fingerprint,
        })
    }

    /// Build the matrix for a corpus and wrap both.
    pub fn build(corpus: Corpus, vectorizer: &dyn DocumentVectorizer) -> Result<Self, RankError> {
        let fingerprint = corpus.fingerprint(&vectorizer.settings_label());
        let matrix = matrix::build(&corpus, vectorizer)?;
        Self::new(corpus, matrix, fingerprint)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn top_similar(&self, index: usize, k: usize) -> Result<Vec<(usize, f64)>, RankError> {
        rank::top_similar(&self.matrix, index, k)
    }
}

pub struct SimilarityIndex {
    current: RwLock<Arc<IndexSnapshot>>,
    writer: Mutex<()>,
}

impl SimilarityIndex {
    pub fn new(snapshot: IndexSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        }
    }

    /// Build a fresh index for a corpus.
    pub fn build(corpus: Corpus, vectorizer: &dyn DocumentVectorizer) -> Result<Self, RankError> {
        Ok(Self::new(IndexSnapshot::build(corpus, vectorizer)?))
    }

    /// Wrap a matrix loaded from elsewhere (the cache). Rejects a matrix
    /// whose dimension disagrees with the corpus.
    pub fn from_parts(
        corpus: Corpus,
        matrix: SimilarityMatrix,
        fingerprint: String,
    ) -> Result<Self, RankError> {
        Ok(Self::new(IndexSnapshot::new(corpus, matrix, fingerprint)?))
    }

    /// The current snapshot. Cheap: clones an Arc.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Signal that the corpus may have changed.
    ///
    /// Returns `Ok(false)` and keeps the current snapshot when the new
    /// corpus has the same fingerprint. Otherwise rebuilds, swaps, and
    /// returns `Ok(true)`. A failed rebuild leaves the current snapshot in
    /// place.
    pub fn corpus_changed(
        &self,
        corpus: Corpus,
        vectorizer: &dyn DocumentVectorizer,
    ) -> Result<bool, RankError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let fingerprint = corpus.fingerprint(&vectorizer.settings_label());
        if fingerprint == self.snapshot().fingerprint() {
            debug!("Corpus unchanged, keeping current similarity matrix");
            return Ok(false);
        }

        let matrix = matrix::build(&corpus, vectorizer)?;
        let snapshot = IndexSnapshot::new(corpus, matrix, fingerprint)?;
        info!(documents = snapshot.corpus().len(), "Swapping in rebuilt similarity index");
        self.replace(snapshot);
        Ok(true)
    }

    /// Install a snapshot unconditionally.
    pub fn replace(&self, snapshot: IndexSnapshot) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(snapshot);
    }

    pub fn top_similar(&self, index: usize, k: usize) -> Result<Vec<(usize, f64)>, RankError> {
        self.snapshot().top_similar(index, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::similarity::tfidf::TfIdfVectorizer;
    use crate::similarity::tokenize::StopWordList;

    fn vectorizer() -> TfIdfVectorizer {
        TfIdfVectorizer::new(StopWordList::Disabled)
    }

    fn sample() -> Corpus {
        Corpus::new(vec![
            Document::new("A", "rust compiler borrow checker"),
            Document::new("B", "rust borrow checker lifetimes"),
            Document::new("C", "sourdough bread baking"),
        ])
    }

    #[test]
    fn test_snapshot_rejects_dimension_mismatch() {
        let matrix = SimilarityMatrix::from_values(1, vec![1.0]).unwrap();
        let err = IndexSnapshot::new(sample(), matrix, String::new()).unwrap_err();
        assert_eq!(err, RankError::DimensionMismatch { matrix: 1, corpus: 3 });
    }

    #[test]
    fn test_unchanged_corpus_keeps_snapshot() {
        let index = SimilarityIndex::build(sample(), &vectorizer()).unwrap();
        let before = index.snapshot();
        assert!(!index.corpus_changed(sample(), &vectorizer()).unwrap());
        assert!(Arc::ptr_eq(&before, &index.snapshot()));
    }

    #[test]
    fn test_changed_corpus_swaps_snapshot() {
        let index = SimilarityIndex::build(sample(), &vectorizer()).unwrap();
        let old = index.snapshot();

        let mut docs = sample().documents().to_vec();
        docs.push(Document::new("D", "bread flour yeast"));
        assert!(index.corpus_changed(Corpus::new(docs), &vectorizer()).unwrap());

        // Old readers still see a consistent 3-document snapshot
        assert_eq!(old.corpus().len(), 3);
        assert_eq!(old.matrix().len(), 3);
        assert_eq!(index.snapshot().matrix().len(), 4);
        assert_eq!(index.top_similar(3, 1).unwrap()[0].0, 2);
    }

    #[test]
    fn test_failed_rebuild_keeps_current() {
        let index = SimilarityIndex::build(sample(), &vectorizer()).unwrap();
        let err = index
            .corpus_changed(Corpus::new(vec![]), &vectorizer())
            .unwrap_err();
        assert_eq!(err, RankError::EmptyCorpus);
        assert_eq!(index.snapshot().corpus().len(), 3);
    }

    #[test]
    fn test_concurrent_readers_during_rebuild() {
        const READERS: usize = 4;
        let index = Arc::new(SimilarityIndex::build(sample(), &vectorizer()).unwrap());
        let start = Arc::new(std::sync::Barrier::new(READERS + 1));

        let readers: Vec<_> = (0..READERS)
            .map(|_| {
                let index = Arc::clone(&index);
                let start = Arc::clone(&start);
                std::thread::spawn(move || {
                    start.wait();
                    // Keep reading until the rebuilt snapshot shows up, so
                    // reads overlap the swap
                    let mut reads = 0usize;
                    loop {
                        let snap = index.snapshot();
                        let n = snap.corpus().len();
                        assert_eq!(snap.matrix().len(), n);
                        let top = snap.top_similar(0, n).unwrap();
                        assert_eq!(top.len(), n - 1);
                        reads += 1;
                        if n == 4 {
                            return reads;
                        }
                        std::thread::yield_now();
                    }
                })
            })
            .collect();

        start.wait();
        let mut docs = sample().documents().to_vec();
        docs.push(Document::new("D", "bread flour yeast"));
        assert!(index.corpus_changed(Corpus::new(docs), &vectorizer()).unwrap());

        for r in readers {
            assert!(r.join().unwrap() >= 1);
        }
        assert_eq!(index.snapshot().corpus().len(), 4);
    }
}
