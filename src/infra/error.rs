use thiserror::Error;

use crate::infra::Position;

/// Everything a search can report back to its caller.
///
/// None of these are fatal: callers inspect the variant and branch, e.g. fall
/// back to an idle or random move on [`SearchError::NoPathFound`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("start position {0} is outside the grid")]
    InvalidStart(Position),

    #[error("goal position {0} is outside the grid")]
    InvalidGoal(Position),

    #[error("no path found after expanding {expanded} nodes")]
    NoPathFound { expanded: usize },

    /// The decision was taken on heuristic values at the depth horizon.
    #[error("search stopped at depth {depth} without reaching a terminal state")]
    DepthExceeded { depth: u32 },

    #[error("unknown heuristic '{0}' (expected 'Manhattan' or 'Euclidean')")]
    UnknownHeuristic(String),

    #[error("unknown search strategy '{0}'")]
    UnknownStrategy(String),

    #[error("beam width must be at least 1")]
    InvalidBeamWidth,

    #[error("invalid grid layout: {0}")]
    InvalidLayout(String),
}
