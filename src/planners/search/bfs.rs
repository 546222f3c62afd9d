use std::collections::VecDeque;

use super::episode::{Episode, PathTree};
use super::{SearchConfig, SearchContext, SearchOutcome, SearchStrategy, path_cost};
use crate::infra::{Position, SearchError};

/// Breadth-first search: FIFO frontier, shortest path by edge count.
pub struct BreadthFirstSearch {
    config: SearchConfig,
    episode: Episode,
    tree: PathTree,
    queue: VecDeque<usize>,
}

impl BreadthFirstSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            episode: Episode::default(),
            tree: PathTree::default(),
            queue: VecDeque::new(),
        }
    }

    /// Nodes waiting in the frontier.
    pub fn frontier_len(&self) -> usize {
        self.queue.len()
    }
}

impl SearchStrategy for BreadthFirstSearch {
    fn name(&self) -> &'static str {
        "BFS"
    }

    fn start_search(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError> {
        self.queue.clear();
        self.tree.clear();
        self.episode.reset(ctx, self.name(), start, goal)?;

        let root = self.tree.push(start, None);
        self.queue.push_back(root);
        Ok(())
    }

    fn explore_step(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        if !self.episode.is_active() {
            return None;
        }

        // Skip stale duplicates so every call expands exactly one new node
        let (index, current) = loop {
            let Some(index) = self.queue.pop_front() else {
                self.episode.finish_exhausted(ctx);
                return None;
            };
            let current = self.tree.position(index);
            if self.episode.expand(ctx, current) {
                break (index, current);
            }
        };

        if ctx.is_goal(current, self.episode.goal) {
            let path = self.tree.path_to(index);
            let cost = path_cost(self.episode.start, &path);
            self.episode.finish_found(ctx, path, cost);
            return Some(current);
        }

        for (next, _) in ctx.neighbors(current, &self.config) {
            if !self.episode.visited.contains(&next) {
                let child = self.tree.push(next, Some(index));
                self.queue.push_back(child);
            }
        }

        Some(current)
    }

    fn outcome(&self) -> &SearchOutcome {
        &self.episode.outcome
    }
}
