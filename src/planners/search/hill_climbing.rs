use std::collections::{HashMap, HashSet, VecDeque};

use super::episode::Episode;
use super::{SearchConfig, SearchContext, SearchOutcome, SearchStrategy, path_cost};
use crate::infra::{Position, SearchError};

/// Greedy descent on the heuristic with an explicit backtrack stack.
///
/// Each call either steps to the unvisited neighbour closest to the goal or,
/// at a local optimum, backs up one cell. The reported path is re-derived
/// through the visited cells once the goal is reached so detours don't
/// survive into `path_to_exit`.
pub struct HillClimbing {
    config: SearchConfig,
    episode: Episode,
    trail: Vec<Position>,
    backtracks: usize,
}

impl HillClimbing {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            episode: Episode::default(),
            trail: Vec::new(),
            backtracks: 0,
        }
    }

    /// Current tail of the walk.
    pub fn current(&self) -> Option<Position> {
        self.trail.last().copied()
    }

    pub fn backtracks(&self) -> usize {
        self.backtracks
    }

    fn best_move(&self, ctx: &SearchContext<'_>, from: Position) -> Option<Position> {
        let mut best: Option<(f64, Position)> = None;
        for (next, _) in ctx.neighbors(from, &self.config) {
            if self.episode.visited.contains(&next) {
                continue;
            }
            let h = self.config.heuristic.distance(next, self.episode.goal);
            // Strict comparison keeps the earliest direction on ties
            if best.is_none_or(|(best_h, _)| h < best_h) {
                best = Some((h, next));
            }
        }
        best.map(|(_, pos)| pos)
    }

    /// Shortest route from start to `goal` through cells this episode has
    /// already expanded.
    fn cleaned_path(&self, ctx: &SearchContext<'_>, goal: Position) -> Vec<Position> {
        let start = self.episode.start;
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                break;
            }
            for (next, _) in ctx.neighbors(current, &self.config) {
                if self.episode.visited.contains(&next) && seen.insert(next) {
                    came_from.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        let mut path = Vec::new();
        let mut current = goal;
        while current != start {
            path.push(current);
            match came_from.get(&current) {
                Some(&prev) => current = prev,
                // Unreachable through visited cells; fall back to the walk
                None => return self.trail[1..].to_vec(),
            }
        }
        path.reverse();
        path
    }
}

impl SearchStrategy for HillClimbing {
    fn name(&self) -> &'static str {
        "Hill Climbing"
    }

    fn start_search(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError> {
        self.trail.clear();
        self.backtracks = 0;
        self.episode.reset(ctx, self.name(), start, goal)?;
        self.trail.push(start);
        Ok(())
    }

    fn explore_step(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        if !self.episode.is_active() {
            return None;
        }
        let Some(&tail) = self.trail.last() else {
            self.episode.finish_exhausted(ctx);
            return None;
        };

        let current = if self.episode.visited.is_empty() {
            self.episode.expand(ctx, tail);
            tail
        } else if let Some(next) = self.best_move(ctx, tail) {
            self.trail.push(next);
            self.episode.expand(ctx, next);
            next
        } else {
            self.trail.pop();
            self.backtracks += 1;
            return match self.trail.last() {
                Some(&back) => {
                    ctx.notify_backtrack(back);
                    Some(back)
                }
                None => {
                    self.episode.finish_exhausted(ctx);
                    None
                }
            };
        };

        if ctx.is_goal(current, self.episode.goal) {
            let path = self.cleaned_path(ctx, current);
            let cost = path_cost(self.episode.start, &path);
            self.episode.finish_found(ctx, path, cost);
        }

        Some(current)
    }

    fn outcome(&self) -> &SearchOutcome {
        &self.episode.outcome
    }
}
