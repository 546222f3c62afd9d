use crate::infra::{Position, SearchObserver};

pub struct CompositeObserver {
    observers: Vec<Box<dyn SearchObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Box<dyn SearchObserver>>) -> Self {
        Self { observers }
    }
}

impl SearchObserver for CompositeObserver {
    fn on_search_started(&mut self, strategy: &str, start: Position, goal: Position) {
        for observer in &mut self.observers {
            observer.on_search_started(strategy, start, goal);
        }
    }

    fn on_node_expanded(&mut self, pos: Position, visit_order: usize) {
        for observer in &mut self.observers {
            observer.on_node_expanded(pos, visit_order);
        }
    }

    fn on_backtrack(&mut self, pos: Position) {
        for observer in &mut self.observers {
            observer.on_backtrack(pos);
        }
    }

    fn on_goal_reached(&mut self, path: &[Position]) {
        for observer in &mut self.observers {
            observer.on_goal_reached(path);
        }
    }

    fn on_search_exhausted(&mut self, expanded: usize) {
        for observer in &mut self.observers {
            observer.on_search_exhausted(expanded);
        }
    }
}
