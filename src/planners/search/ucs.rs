use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use super::episode::{Episode, PathTree};
use super::{SearchConfig, SearchContext, SearchOutcome, SearchStrategy};
use crate::infra::{Position, SearchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    cost: u32,
    // Insertion counter; equal costs pop in FIFO order
    seq: u64,
    index: usize,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.cost, self.seq).cmp(&(other.cost, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Uniform-cost search: always expands the cheapest frontier node.
pub struct UniformCostSearch {
    config: SearchConfig,
    episode: Episode,
    tree: PathTree,
    open: BinaryHeap<Reverse<Entry>>,
    best_cost: HashMap<Position, u32>,
    seq: u64,
}

impl UniformCostSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            episode: Episode::default(),
            tree: PathTree::default(),
            open: BinaryHeap::new(),
            best_cost: HashMap::new(),
            seq: 0,
        }
    }

    fn enqueue(&mut self, index: usize, cost: u32) {
        self.open.push(Reverse(Entry {
            cost,
            seq: self.seq,
            index,
        }));
        self.seq += 1;
    }
}

impl SearchStrategy for UniformCostSearch {
    fn name(&self) -> &'static str {
        "UCS"
    }

    fn start_search(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError> {
        self.open.clear();
        self.best_cost.clear();
        self.tree.clear();
        self.seq = 0;
        self.episode.reset(ctx, self.name(), start, goal)?;

        let root = self.tree.push(start, None);
        self.best_cost.insert(start, 0);
        self.enqueue(root, 0);
        Ok(())
    }

    fn explore_step(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        if !self.episode.is_active() {
            return None;
        }

        let (entry, current) = loop {
            let Some(Reverse(entry)) = self.open.pop() else {
                self.episode.finish_exhausted(ctx);
                return None;
            };
            let current = self.tree.position(entry.index);
            if self.episode.expand(ctx, current) {
                break (entry, current);
            }
        };

        if ctx.is_goal(current, self.episode.goal) {
            let path = self.tree.path_to(entry.index);
            self.episode.finish_found(ctx, path, entry.cost);
            return Some(current);
        }

        for (next, step) in ctx.neighbors(current, &self.config) {
            if self.episode.visited.contains(&next) {
                continue;
            }
            let cost = entry.cost + step;
            let improves = self
                .best_cost
                .get(&next)
                .is_none_or(|&known| cost < known);
            if improves {
                self.best_cost.insert(next, cost);
                let child = self.tree.push(next, Some(entry.index));
                self.enqueue(child, cost);
            }
        }

        Some(current)
    }

    fn outcome(&self) -> &SearchOutcome {
        &self.episode.outcome
    }
}
