pub mod index;
pub mod ranker;
pub mod relevance;

pub use index::SimilarityIndex;
pub use ranker::{RankerConfig, SimilarityRanker};
pub use relevance::relevance_score;
