// Top-k ranking over one row of the similarity matrix.

use std::cmp::Ordering;

use super::error::RankError;
use super::matrix::SimilarityMatrix;

/// The `k` documents most similar to `index`, most similar first.
///
/// The document itself is never included. Equal scores keep the lower
/// document index first. Returns `min(k, n - 1)` entries.
pub fn top_similar(
    matrix: &SimilarityMatrix,
    index: usize,
    k: usize,
) -> Result<Vec<(usize, f64)>, RankError> {
    let row = matrix.row(index).ok_or(RankError::IndexOutOfRange {
        index,
        len: matrix.len(),
    })?;

    let mut candidates: Vec<(usize, f64)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(j, _)| j != index)
        .collect();

    candidates.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
    candidates.truncate(k);

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> SimilarityMatrix {
        #[rustfmt::skip]
        let values = vec![
            1.0, 0.2, 0.7, 0.2,
            0.2, 1.0, 0.1, 0.0,
            0.7, 0.1, 1.0, 0.3,
            0.2, 0.0, 0.3, 1.0,
        ];
        SimilarityMatrix::from_values(4, values).unwrap()
    }

    #[test]
    fn test_orders_by_score_descending() {
        let top = top_similar(&matrix(), 2, 3).unwrap();
        assert_eq!(top, vec![(0, 0.7), (3, 0.3), (1, 0.1)]);
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        // Documents 1 and 3 both score 0.2 against document 0
        let top = top_similar(&matrix(), 0, 3).unwrap();
        assert_eq!(top, vec![(2, 0.7), (1, 0.2), (3, 0.2)]);
    }

    #[test]
    fn test_k_larger_than_corpus() {
        let top = top_similar(&matrix(), 1, 10).unwrap();
        assert_eq!(top.len(), 3);
        assert!(top.iter().all(|&(j, _)| j != 1));
    }

    #[test]
    fn test_k_zero_is_empty() {
        assert!(top_similar(&matrix(), 1, 0).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_index() {
        let err = top_similar(&matrix(), 4, 2).unwrap_err();
        assert_eq!(err, RankError::IndexOutOfRange { index: 4, len: 4 });
    }

    #[test]
    fn test_single_document_has_no_neighbours() {
        let m = SimilarityMatrix::from_values(1, vec![1.0]).unwrap();
        assert!(top_similar(&m, 0, 4).unwrap().is_empty());
    }
}
