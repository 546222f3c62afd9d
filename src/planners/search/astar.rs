use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::episode::Episode;
use super::{SearchConfig, SearchContext, SearchOutcome, SearchStrategy};
use crate::infra::{Position, SearchError};

#[derive(Clone, Copy)]
struct Node {
    pos: Position,
    f_score: f64,
    seq: u64,
}

// Reversed so the max-heap pops the lowest f first, older nodes first on ties.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

/// A* search with `f = g + h`, the heuristic scaled to step-cost units
/// (`h * 10` on orthogonal grids).
pub struct AStarSearch {
    config: SearchConfig,
    episode: Episode,
    open_set: BinaryHeap<Node>,
    came_from: HashMap<Position, Position>,
    g_score: HashMap<Position, u32>,
    seq: u64,
}

impl AStarSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            episode: Episode::default(),
            open_set: BinaryHeap::new(),
            came_from: HashMap::new(),
            g_score: HashMap::new(),
            seq: 0,
        }
    }

    fn heuristic(&self, pos: Position) -> f64 {
        self.config
            .heuristic
            .cost_estimate(pos, self.episode.goal, self.config.movement)
    }

    fn push(&mut self, pos: Position, g: u32) {
        self.open_set.push(Node {
            pos,
            f_score: f64::from(g) + self.heuristic(pos),
            seq: self.seq,
        });
        self.seq += 1;
    }
}

impl SearchStrategy for AStarSearch {
    fn name(&self) -> &'static str {
        "A*"
    }

    fn start_search(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError> {
        self.open_set.clear();
        self.came_from.clear();
        self.g_score.clear();
        self.seq = 0;
        self.episode.reset(ctx, self.name(), start, goal)?;

        self.g_score.insert(start, 0);
        self.push(start, 0);
        Ok(())
    }

    fn explore_step(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position> {
        if !self.episode.is_active() {
            return None;
        }

        let current = loop {
            let Some(Node { pos, .. }) = self.open_set.pop() else {
                self.episode.finish_exhausted(ctx);
                return None;
            };
            if self.episode.expand(ctx, pos) {
                break pos;
            }
        };

        let current_g = self.g_score.get(&current).copied().unwrap_or(0);

        if ctx.is_goal(current, self.episode.goal) {
            let path = reconstruct_path(&self.came_from, self.episode.start, current);
            self.episode.finish_found(ctx, path, current_g);
            return Some(current);
        }

        for (neighbor, step) in ctx.neighbors(current, &self.config) {
            if self.episode.visited.contains(&neighbor) {
                continue;
            }
            let tentative_g = current_g + step;
            if tentative_g < self.g_score.get(&neighbor).copied().unwrap_or(u32::MAX) {
                self.came_from.insert(neighbor, current);
                self.g_score.insert(neighbor, tentative_g);
                self.push(neighbor, tentative_g);
            }
        }

        Some(current)
    }

    fn outcome(&self) -> &SearchOutcome {
        &self.episode.outcome
    }
}

/// Walk parent links back from `current`; `start` itself is left out.
fn reconstruct_path(
    came_from: &HashMap<Position, Position>,
    start: Position,
    mut current: Position,
) -> Vec<Position> {
    let mut path = Vec::new();
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::VisitOrderRecorder;
    use crate::planners::search::{Heuristic, Movement, UniformCostSearch};
    use crate::state::Grid;

    #[test]
    fn test_astar_routes_around_wall() {
        let grid = Grid::from_rows(&[
            ".......", //
            "...#...", //
            "P..#..G", //
            "...#...",
        ])
        .unwrap();
        let mut astar = AStarSearch::new(SearchConfig::default());
        let mut ctx = SearchContext::new(&grid);
        astar
            .start_search(&mut ctx, Position::new(0, 1), Position::new(6, 1))
            .unwrap();
        while astar.explore_step(&mut ctx).is_some() {}

        let outcome = astar.outcome();
        assert!(outcome.has_explored);
        // 6 across plus 2 up and 2 down to clear the wall
        assert_eq!(outcome.path_to_exit.len(), 10);
        assert_eq!(outcome.path_cost, 100);
        assert!(!outcome.path_to_exit.contains(&Position::new(0, 1)));
    }

    #[test]
    fn test_astar_straight_line_expands_only_the_line() {
        let grid = Grid::new(9, 9);
        for heuristic in [Heuristic::Manhattan, Heuristic::Euclidean] {
            let mut astar = AStarSearch::new(SearchConfig::default().with_heuristic(heuristic));
            let mut ctx = SearchContext::new(&grid);
            astar
                .start_search(&mut ctx, Position::new(4, 4), Position::new(8, 4))
                .unwrap();
            while astar.explore_step(&mut ctx).is_some() {}
            assert_eq!(astar.outcome().path_to_exit.len(), 4);
            assert_eq!(astar.outcome().nodes_expanded, 5);
        }
    }

    #[test]
    fn test_equal_f_expands_in_insertion_order() {
        let grid = Grid::new(3, 3);
        let mut recorder = VisitOrderRecorder::new();
        {
            let mut astar = AStarSearch::new(SearchConfig::default());
            let mut ctx = SearchContext::with_observer(&grid, &mut recorder);
            astar
                .start_search(&mut ctx, Position::new(0, 0), Position::new(2, 2))
                .unwrap();
            while astar.explore_step(&mut ctx).is_some() {}
            assert_eq!(astar.outcome().path_cost, 40);
        }
        // Every cell ties at f = 40, so the heap behaves like a FIFO queue
        assert_eq!(
            recorder.sequence(),
            &[
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(0, 2),
                Position::new(1, 1),
                Position::new(2, 0),
                Position::new(1, 2),
                Position::new(2, 1),
                Position::new(2, 2),
            ]
        );
    }

    #[test]
    fn test_diagonal_movement_stays_optimal() {
        let grid = Grid::from_rows(&[
            "......", //
            "..#...", //
            "..#...", //
            "......", //
            "......",
        ])
        .unwrap();
        let start = Position::new(0, 0);
        let goal = Position::new(5, 4);
        for heuristic in [Heuristic::Manhattan, Heuristic::Euclidean] {
            let config = SearchConfig::default()
                .with_heuristic(heuristic)
                .with_movement(Movement::Diagonal);

            let mut astar = AStarSearch::new(config);
            let mut ctx = SearchContext::new(&grid);
            astar.start_search(&mut ctx, start, goal).unwrap();
            while astar.explore_step(&mut ctx).is_some() {}

            let mut ucs = UniformCostSearch::new(config);
            ucs.start_search(&mut ctx, start, goal).unwrap();
            while ucs.explore_step(&mut ctx).is_some() {}

            assert!(astar.outcome().has_explored);
            assert_eq!(astar.outcome().path_cost, ucs.outcome().path_cost, "{}", heuristic);
        }
    }

    #[test]
    fn test_reconstruct_path_skips_start() {
        let mut came_from = HashMap::new();
        came_from.insert(Position::new(1, 0), Position::new(0, 0));
        came_from.insert(Position::new(2, 0), Position::new(1, 0));
        assert_eq!(
            reconstruct_path(&came_from, Position::new(0, 0), Position::new(2, 0)),
            vec![Position::new(1, 0), Position::new(2, 0)]
        );
        assert!(reconstruct_path(&came_from, Position::new(0, 0), Position::new(0, 0)).is_empty());
    }
}
