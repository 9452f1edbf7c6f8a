//! Candidate scoring: semantic similarity, NLI judgment, and verdict
//! combination.

pub mod nli;
pub mod similarity;
pub mod verdict;

pub use nli::{HttpNliJudge, NliConfig, NliJudge, NliJudgment, NliLabel};
pub use similarity::{Embedder, LlmEmbedder, SimilarityScorer};
pub use verdict::{
    sort_by_final_score, ScoredCandidate, VerdictPolicy, JUDGMENT_LOW, JUDGMENT_POSSIBLE,
};
