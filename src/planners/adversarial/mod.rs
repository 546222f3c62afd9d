//! Turn-based decisions against the hazards.

mod alpha_beta;
mod evaluator;

pub use alpha_beta::{AlphaBetaConfig, AlphaBetaSearch, Decision, GameTreeNode, SearchStats};
pub use evaluator::{EvaluationWeights, Evaluator, WeightedEvaluator};
