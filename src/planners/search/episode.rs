use std::collections::HashSet;

use tracing::{debug, trace};

use super::{SearchContext, SearchOutcome, SearchStatus};
use crate::infra::{Position, SearchError};

/// Parent-linked arena of search nodes; each node's path is recovered by
/// walking back to the root.
#[derive(Debug, Default, Clone)]
pub(crate) struct PathTree {
    nodes: Vec<(Position, Option<usize>)>,
}

impl PathTree {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn push(&mut self, pos: Position, parent: Option<usize>) -> usize {
        self.nodes.push((pos, parent));
        self.nodes.len() - 1
    }

    pub fn position(&self, index: usize) -> Position {
        self.nodes[index].0
    }

    /// Path from the root to `index`, root excluded.
    pub fn path_to(&self, index: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            let (pos, parent) = self.nodes[i];
            if parent.is_none() {
                break;
            }
            path.push(pos);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Whether `pos` already lies on the path ending at `index`.
    pub fn path_contains(&self, index: usize, pos: Position) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            let (node_pos, parent) = self.nodes[i];
            if node_pos == pos {
                return true;
            }
            current = parent;
        }
        false
    }
}

/// Bookkeeping shared by every strategy: endpoints, visited set, visit
/// counter and the outcome.
#[derive(Debug, Clone)]
pub(crate) struct Episode {
    pub start: Position,
    pub goal: Position,
    pub visited: HashSet<Position>,
    pub outcome: SearchOutcome,
    started: bool,
    next_visit_order: usize,
}

impl Default for Episode {
    fn default() -> Self {
        Self {
            start: Position::new(0, 0),
            goal: Position::new(0, 0),
            visited: HashSet::new(),
            outcome: SearchOutcome::default(),
            started: false,
            next_visit_order: 0,
        }
    }
}

impl Episode {
    pub fn reset(
        &mut self,
        ctx: &mut SearchContext<'_>,
        strategy: &str,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError> {
        self.started = false;
        self.visited.clear();
        self.outcome = SearchOutcome::default();
        self.next_visit_order = 0;

        if !ctx.grid.in_bounds(start) {
            return Err(SearchError::InvalidStart(start));
        }
        if !ctx.grid.in_bounds(goal) {
            return Err(SearchError::InvalidGoal(goal));
        }

        self.start = start;
        self.goal = goal;
        self.started = true;
        ctx.notify_started(strategy, start, goal);
        Ok(())
    }

    /// True while `explore_step` still has work to do.
    pub fn is_active(&self) -> bool {
        self.started && self.outcome.status == SearchStatus::InProgress
    }

    /// Mark `pos` expanded. Returns false when it already was.
    pub fn expand(&mut self, ctx: &mut SearchContext<'_>, pos: Position) -> bool {
        if !self.visited.insert(pos) {
            return false;
        }
        self.stamp(ctx, pos);
        true
    }

    /// Count an expansion and report its visit order.
    pub fn stamp(&mut self, ctx: &mut SearchContext<'_>, pos: Position) {
        let order = self.next_visit_order;
        self.next_visit_order += 1;
        self.outcome.nodes_expanded += 1;
        trace!(visit_order = order, "expanding {}", pos);
        ctx.notify_expanded(pos, order);
    }

    pub fn finish_found(&mut self, ctx: &mut SearchContext<'_>, path: Vec<Position>, cost: u32) {
        debug!(
            expanded = self.outcome.nodes_expanded,
            length = path.len(),
            cost,
            "goal reached"
        );
        ctx.notify_goal(&path);
        self.outcome.path_to_exit = path;
        self.outcome.path_cost = cost;
        self.outcome.has_explored = true;
        self.outcome.status = SearchStatus::Found;
    }

    pub fn finish_exhausted(&mut self, ctx: &mut SearchContext<'_>) {
        debug!(expanded = self.outcome.nodes_expanded, "frontier exhausted");
        ctx.notify_exhausted(self.outcome.nodes_expanded);
        self.outcome.status = SearchStatus::Exhausted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Grid;

    #[test]
    fn test_path_tree_excludes_root() {
        let mut tree = PathTree::default();
        let root = tree.push(Position::new(0, 0), None);
        let a = tree.push(Position::new(1, 0), Some(root));
        let b = tree.push(Position::new(1, 1), Some(a));
        assert_eq!(tree.path_to(b), vec![Position::new(1, 0), Position::new(1, 1)]);
        assert!(tree.path_to(root).is_empty());
        assert!(tree.path_contains(b, Position::new(0, 0)));
        assert!(!tree.path_contains(a, Position::new(1, 1)));
    }

    #[test]
    fn test_reset_validates_bounds() {
        let grid = Grid::new(3, 3);
        let mut ctx = SearchContext::new(&grid);
        let mut episode = Episode::default();

        assert_eq!(
            episode.reset(&mut ctx, "test", Position::new(3, 0), Position::new(0, 0)),
            Err(SearchError::InvalidStart(Position::new(3, 0)))
        );
        assert!(!episode.is_active());
        assert_eq!(
            episode.reset(&mut ctx, "test", Position::new(0, 0), Position::new(0, -1)),
            Err(SearchError::InvalidGoal(Position::new(0, -1)))
        );
        assert!(episode
            .reset(&mut ctx, "test", Position::new(0, 0), Position::new(2, 2))
            .is_ok());
        assert!(episode.is_active());
        assert!(episode.expand(&mut ctx, Position::new(0, 0)));
        assert!(!episode.expand(&mut ctx, Position::new(0, 0)));
        assert_eq!(episode.outcome.nodes_expanded, 1);
    }
}
