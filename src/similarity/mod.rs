// Similarity ranking: TF-IDF vectors, pairwise cosine matrix, top-k lookup.

pub mod error;
pub mod index;
pub mod matrix;
pub mod rank;
pub mod tfidf;
pub mod tokenize;
pub mod traits;

pub use error::RankError;
pub use index::{IndexSnapshot, SimilarityIndex};
pub use matrix::{build, SimilarityMatrix};
pub use rank::top_similar;
