use std::collections::HashMap;

use crate::infra::Position;

/// Trait for observing search events during an episode.
///
/// Every method has a no-op default so observers only implement what they need.
/// Strategies work the same whether or not an observer is attached.
pub trait SearchObserver {
    /// Called when `start_search` seeds a new episode
    fn on_search_started(&mut self, strategy: &str, start: Position, goal: Position) {
        let _ = (strategy, start, goal);
    }

    /// Called once per expansion with a strictly increasing visit order
    fn on_node_expanded(&mut self, pos: Position, visit_order: usize) {
        let _ = (pos, visit_order);
    }

    /// Called when a backtracking strategy walks back onto `pos`
    fn on_backtrack(&mut self, pos: Position) {
        let _ = pos;
    }

    /// Called when the goal has been reached
    fn on_goal_reached(&mut self, path: &[Position]) {
        let _ = path;
    }

    /// Called when the frontier runs dry without reaching the goal
    fn on_search_exhausted(&mut self, expanded: usize) {
        let _ = expanded;
    }
}

/// Records the visit order of every expanded cell.
#[derive(Debug, Default, Clone)]
pub struct VisitOrderRecorder {
    orders: HashMap<Position, usize>,
    sequence: Vec<Position>,
    backtracks: usize,
}

impl VisitOrderRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit order of the last expansion of `pos`, if it was ever expanded.
    pub fn order_of(&self, pos: &Position) -> Option<usize> {
        self.orders.get(pos).copied()
    }

    /// Expanded positions in expansion order.
    pub fn sequence(&self) -> &[Position] {
        &self.sequence
    }

    pub fn backtracks(&self) -> usize {
        self.backtracks
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.sequence.clear();
        self.backtracks = 0;
    }
}

impl SearchObserver for VisitOrderRecorder {
    fn on_search_started(&mut self, _strategy: &str, _start: Position, _goal: Position) {
        self.clear();
    }

    fn on_node_expanded(&mut self, pos: Position, visit_order: usize) {
        self.orders.insert(pos, visit_order);
        self.sequence.push(pos);
    }

    fn on_backtrack(&mut self, _pos: Position) {
        self.backtracks += 1;
    }
}
