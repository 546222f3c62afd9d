//! Incremental single-agent searches.
//!
//! Every strategy implements [`SearchStrategy`]: `start_search` seeds an
//! episode and each `explore_step` performs one bounded expansion, so a caller
//! can spread a search over simulation ticks.

mod astar;
mod beam;
mod bfs;
mod dfs;
mod episode;
mod heuristic;
mod hill_climbing;
mod runner;
mod ucs;

#[cfg(test)]
mod properties;

use std::fmt;
use std::str::FromStr;

pub use astar::AStarSearch;
pub use beam::BeamSearch;
pub use bfs::BreadthFirstSearch;
pub use dfs::{DepthFirstSearch, DfsMode};
pub use heuristic::Heuristic;
pub use hill_climbing::HillClimbing;
pub use runner::SearchRunner;
pub use ucs::UniformCostSearch;

use crate::infra::{Direction, Position, SearchError, SearchObserver};
use crate::state::{CellTag, GridView, Passability};

pub const ORTHOGONAL_STEP_COST: u32 = 10;
pub const DIAGONAL_STEP_COST: u32 = 13;

/// Common contract of the incremental strategies.
pub trait SearchStrategy {
    fn name(&self) -> &'static str;

    /// Reset all episode state and seed the frontier with `start`.
    fn start_search(
        &mut self,
        ctx: &mut SearchContext<'_>,
        start: Position,
        goal: Position,
    ) -> Result<(), SearchError>;

    /// Expand one node. Returns the expanded position, or `None` once the
    /// frontier is exhausted or the goal was found by an earlier call.
    fn explore_step(&mut self, ctx: &mut SearchContext<'_>) -> Option<Position>;

    fn outcome(&self) -> &SearchOutcome;
}

/// What a strategy reads from and reports to while stepping.
pub struct SearchContext<'a> {
    pub grid: &'a dyn GridView,
    observer: Option<&'a mut dyn SearchObserver>,
}

impl<'a> SearchContext<'a> {
    pub fn new(grid: &'a dyn GridView) -> Self {
        Self {
            grid,
            observer: None,
        }
    }

    pub fn with_observer(grid: &'a dyn GridView, observer: &'a mut dyn SearchObserver) -> Self {
        Self {
            grid,
            observer: Some(observer),
        }
    }

    pub(crate) fn notify_started(&mut self, strategy: &str, start: Position, goal: Position) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_search_started(strategy, start, goal);
        }
    }

    pub(crate) fn notify_expanded(&mut self, pos: Position, visit_order: usize) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_node_expanded(pos, visit_order);
        }
    }

    pub(crate) fn notify_backtrack(&mut self, pos: Position) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_backtrack(pos);
        }
    }

    pub(crate) fn notify_goal(&mut self, path: &[Position]) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_goal_reached(path);
        }
    }

    pub(crate) fn notify_exhausted(&mut self, expanded: usize) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_search_exhausted(expanded);
        }
    }

    pub fn is_goal(&self, pos: Position, goal: Position) -> bool {
        pos == goal || self.grid.cell_tags(pos).contains(CellTag::Goal)
    }

    /// Valid neighbours of `pos` in canonical order with their step cost.
    pub fn neighbors(&self, pos: Position, config: &SearchConfig) -> Vec<(Position, u32)> {
        config
            .movement
            .directions()
            .iter()
            .filter_map(|direction| {
                let next = pos.step(*direction);
                if !self.grid.in_bounds(next)
                    || !self.grid.cell_tags(next).is_passable(config.passability)
                {
                    return None;
                }
                let cost = if direction.is_diagonal() {
                    DIAGONAL_STEP_COST
                } else {
                    ORTHOGONAL_STEP_COST
                };
                Some((next, cost))
            })
            .collect()
    }
}

/// Cost of walking `path` from `start`: 10 per orthogonal step, 13 per diagonal.
pub fn path_cost(start: Position, path: &[Position]) -> u32 {
    let mut previous = start;
    let mut cost = 0;
    for pos in path {
        cost += if pos.x != previous.x && pos.y != previous.y {
            DIAGONAL_STEP_COST
        } else {
            ORTHOGONAL_STEP_COST
        };
        previous = *pos;
    }
    cost
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    InProgress,
    Found,
    Exhausted,
}

/// Result of the current episode, readable at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Positions to walk through, start excluded, goal included.
    pub path_to_exit: Vec<Position>,
    pub has_explored: bool,
    pub status: SearchStatus,
    pub nodes_expanded: usize,
    pub path_cost: u32,
}

impl SearchOutcome {
    pub fn is_finished(&self) -> bool {
        self.status != SearchStatus::InProgress
    }

    pub fn path(&self) -> Result<&[Position], SearchError> {
        match self.status {
            SearchStatus::Found => Ok(&self.path_to_exit),
            _ => Err(SearchError::NoPathFound {
                expanded: self.nodes_expanded,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Movement {
    #[default]
    Orthogonal,
    /// Adds the four diagonals after the orthogonal directions. A* then
    /// switches to diagonal-aware estimates, see [`Heuristic::cost_estimate`].
    Diagonal,
}

impl Movement {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            Movement::Orthogonal => &Direction::ORTHOGONAL,
            Movement::Diagonal => &Direction::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub heuristic: Heuristic,
    pub beam_width: usize,
    pub movement: Movement,
    pub passability: Passability,
    pub dfs_mode: DfsMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::Manhattan,
            beam_width: 3,
            movement: Movement::Orthogonal,
            passability: Passability::BombAssisted,
            dfs_mode: DfsMode::Frontier,
        }
    }
}

impl SearchConfig {
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width;
        self
    }

    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_passability(mut self, passability: Passability) -> Self {
        self.passability = passability;
        self
    }

    pub fn with_dfs_mode(mut self, dfs_mode: DfsMode) -> Self {
        self.dfs_mode = dfs_mode;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Bfs,
    Dfs,
    Ucs,
    AStar,
    Beam,
    HillClimbing,
    AlphaBeta,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::Bfs,
        StrategyKind::Dfs,
        StrategyKind::Ucs,
        StrategyKind::AStar,
        StrategyKind::Beam,
        StrategyKind::HillClimbing,
        StrategyKind::AlphaBeta,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Bfs => "BFS",
            StrategyKind::Dfs => "DFS",
            StrategyKind::Ucs => "UCS",
            StrategyKind::AStar => "A*",
            StrategyKind::Beam => "Beam Search",
            StrategyKind::HillClimbing => "Hill Climbing",
            StrategyKind::AlphaBeta => "Alpha-Beta",
        }
    }

    pub fn is_adversarial(self) -> bool {
        self == StrategyKind::AlphaBeta
    }

    /// Build an incremental strategy. Alpha-Beta decides whole turns and is
    /// built through [`crate::planners::Planner`] instead.
    pub fn build(self, config: &SearchConfig) -> Result<Box<dyn SearchStrategy>, SearchError> {
        Ok(match self {
            StrategyKind::Bfs => Box::new(BreadthFirstSearch::new(*config)),
            StrategyKind::Dfs => Box::new(DepthFirstSearch::new(*config)),
            StrategyKind::Ucs => Box::new(UniformCostSearch::new(*config)),
            StrategyKind::AStar => Box::new(AStarSearch::new(*config)),
            StrategyKind::Beam => Box::new(BeamSearch::new(*config)?),
            StrategyKind::HillClimbing => Box::new(HillClimbing::new(*config)),
            StrategyKind::AlphaBeta => {
                return Err(SearchError::UnknownStrategy(format!(
                    "{} is not an incremental strategy",
                    self.as_str()
                )));
            }
        })
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "bfs" | "breadthfirst" => Ok(StrategyKind::Bfs),
            "dfs" | "depthfirst" => Ok(StrategyKind::Dfs),
            "ucs" | "uniformcost" => Ok(StrategyKind::Ucs),
            "a*" | "astar" => Ok(StrategyKind::AStar),
            "beam" | "beamsearch" => Ok(StrategyKind::Beam),
            "hillclimbing" => Ok(StrategyKind::HillClimbing),
            "alphabeta" | "minimax" => Ok(StrategyKind::AlphaBeta),
            _ => Err(SearchError::UnknownStrategy(s.to_string())),
        }
    }
}
