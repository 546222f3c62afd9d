use std::collections::{HashSet, VecDeque};

use super::episode::{Episode, PathTree};
use super::{SearchConfig, SearchContext, SearchOutcome, SearchStrategy, path_cost};
use crate::infra::{Position, SearchError};

/// Level-by-level search that keeps only the `beam_width` partial paths whose
/// tails look closest to the goal. Incomplete: the beam may drop every path
/// that leads to the goal.
pub struct BeamSearch {
    config: SearchConfig,
    episode: Episode,
    tree: PathTree,
    level: VecDeque<usize>,
    candidates: Vec<usize>,
    depth: usize,
}

impl BeamSearch {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        if config.beam_width == 0 {
            return Err(SearchError::InvalidBeamWidth);
        }
        Ok(Self {
            config,
            episode: Episode::default(),
            tree: PathTree::default(),
            level: VecDeque::new(),
            candidates: Vec::new(),
            depth: 0,
        })
    }

    pub fn beam_width(&self) -> usize {
        self.config.beam_width
    }

    /// Number of completed levels.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Rank this level's continuations and keep the best `beam_width`.
    fn advance_level(&mut self) {
        let mut seen = HashSet::new();
        let mut ranked: Vec<(f64, usize)> = self
            .candidates
            .drain(..)
            .filter_map(|index| {
                let tail = self.tree.position(index);
                if self.episode.visited.contains(&tail) || !seen.insert(tail) {
                    return None;
                }
                Some((self.config.heuristic.distance(tail, self.episode.goal), index))
            })
            .collect();

        // Stable, so ties keep generation order
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.truncate(self.config.beam_width);

        self.level = ranked.into_iter().map(|(_, index)| index).collect();
        self.depth += 1;
    }
}

impl SearchStrategy for BeamSearch {
    fn name(&self) -> &'static str {
        "Beam Search"
    }

    fn start_search(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError> {
        self.level.clear();
        self.candidates.clear();
        self.tree.clear();
        self.depth = 0;
        self.episode.reset(ctx, self.name(), start, goal)?;

        let root = self.tree.push(start, None);
        self.level.push_back(root);
        Ok(())
    }

    fn explore_step(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        if !self.episode.is_active() {
            return None;
        }

        let (index, current) = loop {
            let Some(index) = self.level.pop_front() else {
                if self.candidates.is_empty() {
                    self.episode.finish_exhausted(ctx);
                    return None;
                }
                self.advance_level();
                continue;
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
            if !self.episode.visited.contains(&next) && !self.tree.path_contains(index, next) {
                let child = self.tree.push(next, Some(index));
                self.candidates.push(child);
            }
        }

        Some(current)
    }

    fn outcome(&self) -> &SearchOutcome {
        &self.episode.outcome
    }
}
