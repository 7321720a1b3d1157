// Pairwise cosine similarity matrix.
//
// Built once per corpus and treated as immutable afterwards. Each unordered
// pair is computed once and mirrored, so the matrix is exactly symmetric.
// Every value lies in [0, 1]: term weights are non-negative, and the result
// is clamped to absorb floating-point drift.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::RankError;
use super::tfidf::TermVector;
use super::traits::DocumentVectorizer;
use crate::corpus::Corpus;

/// Square, symmetric matrix of document similarities, stored row-major.
///
/// Deserialization goes through `validate`, so a matrix read from JSON is
/// never indexed out of bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

/// Unchecked wire form of a matrix.
#[derive(Deserialize)]
struct RawMatrix {
    size: usize,
    values: Vec<f64>,
}

impl TryFrom<RawMatrix> for SimilarityMatrix {
    type Error = RankError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        Self::from_values(raw.size, raw.values)
    }
}

impl SimilarityMatrix {
    /// Wrap raw row-major values, checking shape, symmetry and range.
    pub fn from_values(size: usize, values: Vec<f64>) -> Result<Self, RankError> {
        let matrix = Self { size, values };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Number of documents (rows and columns).
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.size && j < self.size {
            Some(self.values[i * self.size + j])
        } else {
            None
        }
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i < self.size {
            Some(&self.values[i * self.size..(i + 1) * self.size])
        } else {
            None
        }
    }

    /// Check the matrix invariants. Used on anything read back from the cache.
    pub fn validate(&self) -> Result<(), RankError> {
        if self.size.checked_mul(self.size) != Some(self.values.len()) {
            return Err(RankError::InvalidMatrix {
                reason: format!(
                    "{} values for a {}x{} matrix",
                    self.values.len(),
                    self.size,
                    self.size
                ),
            });
        }
        for i in 0..self.size {
            for j in i..self.size {
                let a = self.values[i * self.size + j];
                let b = self.values[j * self.size + i];
                if !(0.0..=1.0).contains(&a) {
                    return Err(RankError::InvalidMatrix {
                        reason: format!("value {a} at ({i}, {j}) is outside [0, 1]"),
                    });
                }
                if a != b {
                    return Err(RankError::InvalidMatrix {
                        reason: format!("not symmetric at ({i}, {j})"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Cosine similarity of two term vectors; 0.0 when either has zero norm.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_zero() || b.is_zero() {
        return 0.0;
    }
    let denom = a.norm() * b.norm();
    if denom == 0.0 || !denom.is_finite() {
        // Weights so small or large that the norms underflow or overflow
        let (a, b) = (max_scaled(a), max_scaled(b));
        return (a.dot(&b) / (a.norm() * b.norm())).clamp(0.0, 1.0);
    }
    (a.dot(b) / denom).clamp(0.0, 1.0)
}

/// Divide every weight by the largest one so the biggest entry is 1.0.
fn max_scaled(v: &TermVector) -> TermVector {
    let max = v
        .entries()
        .iter()
        .map(|&(_, w)| w.abs())
        .fold(0.0_f64, f64::max);
    TermVector::from_entries(v.entries().iter().map(|&(idx, w)| (idx, w / max)).collect())
}

/// Build the similarity matrix for a corpus.
///
/// Fails on an empty corpus or on any document whose body is absent. An
/// empty body is allowed and produces an all-zero row and column, diagonal
/// included.
pub fn build(
    corpus: &Corpus,
    vectorizer: &dyn DocumentVectorizer,
) -> Result<SimilarityMatrix, RankError> {
    if corpus.is_empty() {
        return Err(RankError::EmptyCorpus);
    }

    let mut bodies: Vec<&str> = Vec::with_capacity(corpus.len());
    for (index, doc) in corpus.iter().enumerate() {
        match doc.body.as_deref() {
            Some(body) => bodies.push(body),
            None => {
                return Err(RankError::InvalidDocument {
                    index,
                    title: doc.title.clone(),
                })
            }
        }
    }

    let vectorized = vectorizer.vectorize(&bodies)?;
    let vectors = &vectorized.vectors;
    if vectors.len() != corpus.len() {
        return Err(RankError::DimensionMismatch {
            matrix: vectors.len(),
            corpus: corpus.len(),
        });
    }
    let n = vectors.len();
    let mut values = vec![0.0; n * n];

    for i in 0..n {
        values[i * n + i] = if vectors[i].is_zero() { 0.0 } else { 1.0 };
        for j in (i + 1)..n {
            let sim = cosine_similarity(&vectors[i], &vectors[j]);
            values[i * n + j] = sim;
            values[j * n + i] = sim;
        }
    }

    info!(
        documents = n,
        vocabulary = vectorized.vocabulary.len(),
        "Built similarity matrix"
    );

    Ok(SimilarityMatrix { size: n, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::similarity::tfidf::TfIdfVectorizer;
    use crate::similarity::tfidf::Vocabulary;
    use crate::similarity::tokenize::StopWordList;
    use crate::similarity::traits::Vectorized;

    fn corpus(bodies: &[&str]) -> Corpus {
        Corpus::new(
            bodies
                .iter()
                .enumerate()
                .map(|(i, b)| Document::new(format!("doc {i}"), *b))
                .collect(),
        )
    }

    #[test]
    fn test_build_shape_and_diagonal() {
        let c = corpus(&["red apples", "green apples", "blue sky"]);
        let m = build(&c, &TfIdfVectorizer::new(StopWordList::Disabled)).unwrap();
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), Some(1.0));
        }
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_disjoint_documents_score_zero() {
        let c = corpus(&["red apples", "blue sky"]);
        let m = build(&c, &TfIdfVectorizer::new(StopWordList::Disabled)).unwrap();
        assert_eq!(m.get(0, 1), Some(0.0));
    }

    #[test]
    fn test_absent_body_is_invalid() {
        let c = Corpus::new(vec![
            Document::new("A", "text"),
            Document::without_body("B"),
        ]);
        let err = build(&c, &TfIdfVectorizer::default()).unwrap_err();
        assert_eq!(
            err,
            RankError::InvalidDocument {
                index: 1,
                title: "B".to_string()
            }
        );
    }

    #[test]
    fn test_from_values_rejects_bad_shape() {
        let err = SimilarityMatrix::from_values(2, vec![1.0, 0.5, 0.5]).unwrap_err();
        assert!(matches!(err, RankError::InvalidMatrix { .. }));
    }

    #[test]
    fn test_from_values_rejects_asymmetry() {
        let err = SimilarityMatrix::from_values(2, vec![1.0, 0.5, 0.4, 1.0]).unwrap_err();
        assert!(matches!(err, RankError::InvalidMatrix { .. }));
    }

    #[test]
    fn test_from_values_rejects_out_of_range() {
        let err = SimilarityMatrix::from_values(1, vec![1.5]).unwrap_err();
        assert!(matches!(err, RankError::InvalidMatrix { .. }));
        assert!(SimilarityMatrix::from_values(1, vec![f64::NAN]).is_err());
    }

    #[test]
    fn test_cosine_of_tiny_non_zero_vectors() {
        let v = TermVector::from_entries(vec![(0, 1e-9)]);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);

        let w = TermVector::from_entries(vec![(0, 1e-200), (1, 1e-200)]);
        let x = TermVector::from_entries(vec![(0, 1e-200)]);
        let sim = cosine_similarity(&w, &x);
        assert!((sim - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12, "{sim}");

        assert_eq!(cosine_similarity(&v, &TermVector::default()), 0.0);
    }

    /// Returns a fixed vector list regardless of input.
    struct FixedVectorizer(Vec<TermVector>);

    impl DocumentVectorizer for FixedVectorizer {
        fn vectorize(&self, _bodies: &[&str]) -> Result<Vectorized, RankError> {
            Ok(Vectorized {
                vocabulary: Vocabulary::default(),
                vectors: self.0.clone(),
            })
        }

        fn settings_label(&self) -> String {
            "fixed".to_string()
        }
    }

    #[test]
    fn test_build_rejects_wrong_vector_count() {
        let c = corpus(&["a b", "c d", "e f"]);
        let short = FixedVectorizer(vec![TermVector::from_entries(vec![(0, 1.0)])]);
        assert_eq!(
            build(&c, &short).unwrap_err(),
            RankError::DimensionMismatch {
                matrix: 1,
                corpus: 3
            }
        );
    }

    #[test]
    fn test_build_diagonal_matches_self_cosine_for_unnormalized_vectors() {
        let c = corpus(&["x", "y"]);
        let tiny = FixedVectorizer(vec![
            TermVector::from_entries(vec![(0, 1e-9)]),
            TermVector::from_entries(vec![(0, 3e-9), (1, 4e-9)]),
        ]);
        let m = build(&c, &tiny).unwrap();
        assert_eq!(m.get(0, 0), Some(1.0));
        assert!((m.get(0, 1).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_deserialize_validates() {
        let bad: Result<SimilarityMatrix, _> =
            serde_json::from_str(r#"{"size":3,"values":[1.0]}"#);
        assert!(bad.is_err());

        let asymmetric: Result<SimilarityMatrix, _> =
            serde_json::from_str(r#"{"size":2,"values":[1.0,0.5,0.4,1.0]}"#);
        assert!(asymmetric.is_err());

        let huge: Result<SimilarityMatrix, _> =
            serde_json::from_str(r#"{"size":18446744073709551615,"values":[]}"#);
        assert!(huge.is_err());

        let m = SimilarityMatrix::from_values(2, vec![1.0, 0.25, 0.25, 1.0]).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(serde_json::from_str::<SimilarityMatrix>(&json).unwrap(), m);
    }

    #[test]
    fn test_row_and_get_bounds() {
        let m = SimilarityMatrix::from_values(2, vec![1.0, 0.25, 0.25, 1.0]).unwrap();
        assert_eq!(m.row(1), Some(&[0.25, 1.0][..]));
        assert_eq!(m.row(2), None);
        assert_eq!(m.get(0, 2), None);
    }
}
