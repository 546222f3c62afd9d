use super::episode::{Episode, PathTree};
use super::{SearchConfig, SearchContext, SearchOutcome, SearchStrategy, path_cost};
use crate::infra::{Position, SearchError};

/// How depth-first search orders its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DfsMode {
    /// LIFO frontier of discovered nodes. Neighbours are pushed in reverse so
    /// the first canonical direction is explored first.
    #[default]
    Frontier,
    /// Walk a single path, stepping to the first unvisited neighbour and
    /// backing up one cell per call at dead ends.
    Walk,
}

/// Depth-first search in either [`DfsMode`].
pub struct DepthFirstSearch {
    config: SearchConfig,
    episode: Episode,
    tree: PathTree,
    frontier: Vec<usize>,
    walk: Vec<Position>,
}

impl DepthFirstSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            episode: Episode::default(),
            tree: PathTree::default(),
            frontier: Vec::new(),
            walk: Vec::new(),
        }
    }

    pub fn mode(&self) -> DfsMode {
        self.config.dfs_mode
    }

    fn step_frontier(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        let (index, current) = loop {
            let Some(index) = self.frontier.pop() else {
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

        for (next, _) in ctx.neighbors(current, &self.config).into_iter().rev() {
            if !self.episode.visited.contains(&next) {
                let child = self.tree.push(next, Some(index));
                self.frontier.push(child);
            }
        }

        Some(current)
    }

    fn step_walk(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        let Some(&top) = self.walk.last() else {
            self.episode.finish_exhausted(ctx);
            return None;
        };

        let current = if self.episode.visited.is_empty() {
            // First call expands the start itself
            self.episode.expand(ctx, top);
            top
        } else {
            let next = ctx
                .neighbors(top, &self.config)
                .into_iter()
                .map(|(pos, _)| pos)
                .find(|pos| !self.episode.visited.contains(pos));

            match next {
                Some(next) => {
                    self.walk.push(next);
                    self.episode.expand(ctx, next);
                    next
                }
                None => {
                    self.walk.pop();
                    return match self.walk.last() {
                        Some(&back) => {
                            ctx.notify_backtrack(back);
                            Some(back)
                        }
                        None => {
                            self.episode.finish_exhausted(ctx);
                            None
                        }
                    };
                }
            }
        };

        if ctx.is_goal(current, self.episode.goal) {
            let path = self.walk[1..].to_vec();
            let cost = path_cost(self.episode.start, &path);
            self.episode.finish_found(ctx, path, cost);
        }

        Some(current)
    }
}

impl SearchStrategy for DepthFirstSearch {
    fn name(&self) -> &'static str {
        "DFS"
    }

    fn start_search(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError> {
        self.frontier.clear();
        self.walk.clear();
        self.tree.clear();
        self.episode.reset(ctx, self.name(), start, goal)?;

        match self.config.dfs_mode {
            DfsMode::Frontier => {
                let root = self.tree.push(start, None);
                self.frontier.push(root);
            }
            DfsMode::Walk => self.walk.push(start),
        }
        Ok(())
    }

    fn explore_step(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        if !self.episode.is_active() {
            return None;
        }
        match self.config.dfs_mode {
            DfsMode::Frontier => self.step_frontier(ctx),
            DfsMode::Walk => self.step_walk(ctx),
        }
    }

    fn outcome(&self) -> &SearchOutcome {
        &self.episode.outcome
    }
}
