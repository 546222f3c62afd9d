pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use infra::{Direction, Position, SearchError, SearchObserver};
pub use planners::Planner;
pub use planners::adversarial::{AlphaBetaConfig, AlphaBetaSearch};
pub use planners::search::{SearchConfig, SearchContext, SearchStrategy, StrategyKind};
pub use state::{Action, GameState, Grid, GridView};
