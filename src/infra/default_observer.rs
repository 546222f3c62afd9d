use tracing::{debug, info, trace};

use crate::infra::{Position, SearchObserver};

/// Observer that reports search progress through `tracing`.
pub struct DefaultObserver;

impl SearchObserver for DefaultObserver {
    fn on_search_started(&mut self, strategy: &str, start: Position, goal: Position) {
        info!("{} search started", strategy);
        info!("- start: {}", start);
        info!("- goal: {}", goal);
    }

    fn on_node_expanded(&mut self, pos: Position, visit_order: usize) {
        trace!(visit_order, "expanded {}", pos);
    }

    fn on_backtrack(&mut self, pos: Position) {
        debug!("backtracking to {}", pos);
    }

    fn on_goal_reached(&mut self, path: &[Position]) {
        info!("Goal reached, path length {}", path.len());
        debug!("path: {:?}", path);
    }

    fn on_search_exhausted(&mut self, expanded: usize) {
        info!("Search exhausted after {} expansions, no path", expanded);
    }
}
