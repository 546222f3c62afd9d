pub mod adversarial;
pub mod search;

use crate::infra::SearchError;
use adversarial::{AlphaBetaConfig, AlphaBetaSearch};
use search::{SearchConfig, SearchRunner, StrategyKind};

/// The two ways a tick gets its decision: stepping an incremental search, or
/// running alpha-beta for the whole turn.
pub enum Planner {
    Incremental(SearchRunner),
    Adversarial(AlphaBetaSearch),
}

impl Planner {
    pub fn from_kind(
        kind: StrategyKind,
        search: &SearchConfig,
        adversarial: &AlphaBetaConfig,
    ) -> Result<Self, SearchError> {
        if kind.is_adversarial() {
            Ok(Planner::Adversarial(AlphaBetaSearch::new(*adversarial)))
        } else {
            Ok(Planner::Incremental(SearchRunner::from_kind(kind, search)?))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Planner::Incremental(runner) => runner.name(),
            Planner::Adversarial(_) => StrategyKind::AlphaBeta.as_str(),
        }
    }
}
