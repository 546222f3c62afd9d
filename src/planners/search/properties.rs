//! Cross-strategy checks on hand-built and seeded random grids.

use std::collections::{HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::infra::VisitOrderRecorder;
use crate::state::{CellTag, CellTags, Grid};

const COMPLETE: [StrategyKind; 5] = [
    StrategyKind::Bfs,
    StrategyKind::Dfs,
    StrategyKind::Ucs,
    StrategyKind::AStar,
    StrategyKind::HillClimbing,
];

fn run(
    kind: StrategyKind,
    config: &SearchConfig,
    grid: &Grid,
    start: Position,
    goal: Position,
) -> (SearchOutcome, VisitOrderRecorder) {
    let mut strategy = kind.build(config).unwrap();
    let mut recorder = VisitOrderRecorder::new();
    {
        let mut ctx = SearchContext::with_observer(grid, &mut recorder);
        strategy.start_search(&mut ctx, start, goal).unwrap();
        let mut guard = 0;
        while strategy.explore_step(&mut ctx).is_some() {
            guard += 1;
            assert!(guard < 10_000, "{} never finished", kind);
        }
    }
    (strategy.outcome().clone(), recorder)
}

fn reachable(grid: &Grid, config: &SearchConfig, start: Position, goal: Position) -> bool {
    let ctx = SearchContext::new(grid);
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        if ctx.is_goal(pos, goal) {
            return true;
        }
        for (next, _) in ctx.neighbors(pos, config) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

fn random_grid(rng: &mut StdRng, size: i32) -> (Grid, Position, Position) {
    let mut grid = Grid::new(size, size);
    for x in 0..size {
        for y in 0..size {
            let pos = Position::new(x, y);
            if rng.random_bool(0.3) {
                grid.add_tag(pos, CellTag::IndestructibleObstacle);
            } else if rng.random_bool(0.15) {
                grid.add_tag(pos, CellTag::DestructibleObstacle);
            }
        }
    }
    let start = Position::new(rng.random_range(0..size), rng.random_range(0..size));
    let goal = Position::new(rng.random_range(0..size), rng.random_range(0..size));
    grid.set(start, CellTags::empty());
    grid.set(goal, CellTags::empty());
    (grid, start, goal)
}

fn assert_walkable(grid: &Grid, config: &SearchConfig, start: Position, path: &[Position]) {
    let mut previous = start;
    for pos in path {
        assert!(previous.is_adjacent(pos), "{} -> {}", previous, pos);
        assert!(grid.cell_tags(*pos).is_passable(config.passability));
        previous = *pos;
    }
    let unique: HashSet<_> = path.iter().collect();
    assert_eq!(unique.len(), path.len(), "path repeats a cell");
    assert!(!path.contains(&start));
}

#[test]
fn test_open_grid_bfs_path_has_eight_moves() {
    let grid = Grid::new(5, 5);
    let (outcome, _) = run(
        StrategyKind::Bfs,
        &SearchConfig::default(),
        &grid,
        Position::new(0, 0),
        Position::new(4, 4),
    );
    assert!(outcome.has_explored);
    assert_eq!(outcome.path_to_exit.len(), 8);
}

#[test]
fn test_metal_wall_yields_no_path() {
    let grid = Grid::from_rows(&[
        "...#...", //
        "...#...", //
        "P..#..G", //
        "...#...",
    ])
    .unwrap();
    let start = Position::new(0, 1);
    let goal = Position::new(6, 1);
    for kind in COMPLETE {
        for mode in [DfsMode::Frontier, DfsMode::Walk] {
            let config = SearchConfig::default().with_dfs_mode(mode);
            let (outcome, _) = run(kind, &config, &grid, start, goal);
            assert!(!outcome.has_explored, "{}", kind);
            assert_eq!(outcome.status, SearchStatus::Exhausted, "{}", kind);
            assert_eq!(
                outcome.path(),
                Err(SearchError::NoPathFound { expanded: 12 }),
                "{}",
                kind
            );
        }
    }
}

#[test]
fn test_bfs_length_matches_manhattan_on_open_grid() {
    let grid = Grid::new(8, 6);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..25 {
        let start = Position::new(rng.random_range(0..8), rng.random_range(0..6));
        let goal = Position::new(rng.random_range(0..8), rng.random_range(0..6));
        let (outcome, _) = run(StrategyKind::Bfs, &SearchConfig::default(), &grid, start, goal);
        assert_eq!(outcome.path_to_exit.len() as i32, start.distance(&goal));
    }
}

#[test]
fn test_weighted_searches_match_bfs_cost_orthogonally() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = SearchConfig::default();
    for _ in 0..40 {
        let (grid, start, goal) = random_grid(&mut rng, 9);
        let (bfs, _) = run(StrategyKind::Bfs, &config, &grid, start, goal);
        if !bfs.has_explored {
            continue;
        }
        let (ucs, _) = run(StrategyKind::Ucs, &config, &grid, start, goal);
        let (astar, _) = run(StrategyKind::AStar, &config, &grid, start, goal);

        let bfs_cost = bfs.path_to_exit.len() as u32 * ORTHOGONAL_STEP_COST;
        assert_eq!(bfs.path_cost, bfs_cost);
        assert_eq!(ucs.path_cost, bfs_cost);
        assert_eq!(astar.path_cost, bfs_cost);
        assert!(astar.nodes_expanded <= ucs.nodes_expanded);
    }
}

#[test]
fn test_astar_expands_no_more_than_ucs_from_center() {
    let grid = Grid::new(9, 9);
    let config = SearchConfig::default();
    let start = Position::new(4, 4);
    let goal = Position::new(8, 4);
    let (ucs, _) = run(StrategyKind::Ucs, &config, &grid, start, goal);
    for heuristic in [Heuristic::Manhattan, Heuristic::Euclidean] {
        let (astar, _) = run(
            StrategyKind::AStar,
            &config.with_heuristic(heuristic),
            &grid,
            start,
            goal,
        );
        assert_eq!(astar.path_cost, ucs.path_cost);
        assert!(astar.nodes_expanded < ucs.nodes_expanded);
    }
}

#[test]
fn test_explored_iff_reachable_on_random_grids() {
    let mut rng = StdRng::seed_from_u64(2024);
    for passability in [Passability::BombAssisted, Passability::OpenOnly] {
        for _ in 0..30 {
            let (grid, start, goal) = random_grid(&mut rng, 8);
            for mode in [DfsMode::Frontier, DfsMode::Walk] {
                let config = SearchConfig::default()
                    .with_passability(passability)
                    .with_dfs_mode(mode);
                let expected = reachable(&grid, &config, start, goal);

                for kind in COMPLETE {
                    let (outcome, _) = run(kind, &config, &grid, start, goal);
                    assert_eq!(outcome.has_explored, expected, "{} {} -> {}", kind, start, goal);
                    if outcome.has_explored {
                        assert_walkable(&grid, &config, start, &outcome.path_to_exit);
                    }
                }

                // Beam search is incomplete: success still implies a real path
                let (beam, _) = run(StrategyKind::Beam, &config, &grid, start, goal);
                if beam.has_explored {
                    assert!(expected);
                    assert_walkable(&grid, &config, start, &beam.path_to_exit);
                }
            }
        }
    }
}

#[test]
fn test_no_cell_is_expanded_twice() {
    let mut rng = StdRng::seed_from_u64(99);
    let config = SearchConfig::default();
    for _ in 0..20 {
        let (grid, start, goal) = random_grid(&mut rng, 10);
        for kind in StrategyKind::ALL.into_iter().filter(|k| !k.is_adversarial()) {
            let (outcome, recorder) = run(kind, &config, &grid, start, goal);
            let unique: HashSet<_> = recorder.sequence().iter().collect();
            assert_eq!(unique.len(), recorder.sequence().len(), "{}", kind);
            assert_eq!(outcome.nodes_expanded, recorder.sequence().len());
            for (order, pos) in recorder.sequence().iter().enumerate() {
                assert_eq!(recorder.order_of(pos), Some(order));
            }
        }
    }
}

#[test]
fn test_goal_found_once_then_idle() {
    let grid = Grid::new(4, 4);
    for kind in StrategyKind::ALL.into_iter().filter(|k| !k.is_adversarial()) {
        let mut strategy = kind.build(&SearchConfig::default()).unwrap();
        let mut ctx = SearchContext::new(&grid);
        let goal = Position::new(3, 3);
        strategy
            .start_search(&mut ctx, Position::new(0, 0), goal)
            .unwrap();
        let mut last = None;
        while let Some(pos) = strategy.explore_step(&mut ctx) {
            last = Some(pos);
        }
        assert_eq!(last, Some(goal), "{}", kind);
        assert_eq!(strategy.explore_step(&mut ctx), None);
        assert!(strategy.outcome().has_explored);
    }
}
