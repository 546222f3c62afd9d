mod composite_observer;
mod default_observer;
mod error;
mod search_observer;
mod types;

pub use composite_observer::CompositeObserver;
pub use default_observer::DefaultObserver;
pub use error::SearchError;
pub use search_observer::{SearchObserver, VisitOrderRecorder};
pub use types::{Direction, Position};

// ============================================================================
// Helper functions
// ============================================================================

/// Direction of the first step of `path` when walking from `current`.
pub fn path_to_direction(current: Position, path: &[Position]) -> Option<Direction> {
    let next = *path.first()?;
    let delta = (next.x - current.x, next.y - current.y);
    Direction::ALL
        .into_iter()
        .find(|direction| direction.delta() == delta)
}
