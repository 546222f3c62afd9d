use tracing::debug;

use super::evaluator::{EvaluationWeights, Evaluator, WeightedEvaluator};
use crate::infra::SearchError;
use crate::state::{Action, GameState, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaBetaConfig {
    pub depth: u32,
    /// Off gives plain minimax, useful as a reference.
    pub pruning: bool,
    pub weights: EvaluationWeights,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            pruning: true,
            weights: EvaluationWeights::default(),
        }
    }
}

impl AlphaBetaConfig {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_weights(mut self, weights: EvaluationWeights) -> Self {
        self.weights = weights;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_visited: usize,
    pub cutoffs: usize,
    /// Leaves scored by the evaluator because the depth ran out.
    pub horizon_hits: usize,
}

/// Root decision plus how it was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub value: f32,
    pub depth: u32,
    pub horizon_reached: bool,
    pub stats: SearchStats,
}

impl Decision {
    /// `Err(DepthExceeded)` when the value rests on heuristic leaves rather
    /// than terminal states. The action is usable either way.
    pub fn status(&self) -> Result<(), SearchError> {
        if self.horizon_reached {
            Err(SearchError::DepthExceeded { depth: self.depth })
        } else {
            Ok(())
        }
    }
}

/// A state with lazily generated children.
pub struct GameTreeNode {
    pub state: GameState,
    children: Option<Vec<GameTreeNode>>,
}

impl GameTreeNode {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            children: None,
        }
    }

    /// The action that produced this node.
    pub fn action(&self) -> Action {
        self.state
            .last_ply()
            .map(|ply| ply.action)
            .unwrap_or(Action::None)
    }

    pub fn children(&mut self) -> &mut [GameTreeNode] {
        let state = &self.state;
        self.children
            .get_or_insert_with(|| {
                state
                    .get_children()
                    .into_iter()
                    .map(GameTreeNode::new)
                    .collect()
            })
            .as_mut_slice()
    }

    /// Drop the subtree once its value is known.
    fn release(&mut self) {
        self.children = None;
    }
}

/// Depth-bounded minimax with optional alpha-beta pruning. The protagonist
/// maximizes, the hazards minimize; the state says whose ply it is.
pub struct AlphaBetaSearch {
    config: AlphaBetaConfig,
    evaluator: Box<dyn Evaluator>,
    stats: SearchStats,
}

impl AlphaBetaSearch {
    pub fn new(config: AlphaBetaConfig) -> Self {
        let evaluator = Box::new(WeightedEvaluator::new(config.weights));
        Self::with_evaluator(config, evaluator)
    }

    pub fn with_evaluator(config: AlphaBetaConfig, evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            config,
            evaluator,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &AlphaBetaConfig {
        &self.config
    }

    /// Statistics of the last decision.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn run(&mut self, state: GameState, depth: u32, protagonist_turn: bool) -> Action {
        self.decide(state, depth, protagonist_turn).action
    }

    /// Search `depth` plies (at least one) below `state` and pick the root
    /// action best for the side to move. Ties keep the first child in
    /// generation order.
    #[tracing::instrument(level = "debug", skip(self, state))]
    pub fn decide(&mut self, state: GameState, depth: u32, protagonist_turn: bool) -> Decision {
        self.stats = SearchStats::default();
        let depth = depth.max(1);
        let side = if protagonist_turn {
            Side::Protagonist
        } else {
            Side::Hazards
        };
        let maximizing = side == Side::Protagonist;
        let mut root = GameTreeNode::new(state.with_turn(side));
        self.stats.nodes_visited += 1;

        let mut alpha = f32::NEG_INFINITY;
        let mut beta = f32::INFINITY;
        let mut best: Option<(Action, f32)> = None;

        for child in root.children() {
            let value = self.alpha_beta(child, depth - 1, alpha, beta);
            let improves = match best {
                None => true,
                Some((_, best_value)) if maximizing => value > best_value,
                Some((_, best_value)) => value < best_value,
            };
            if improves {
                best = Some((child.action(), value));
            }
            if let (true, Some((_, best_value))) = (self.config.pruning, best) {
                if maximizing {
                    alpha = alpha.max(best_value);
                } else {
                    beta = beta.min(best_value);
                }
            }
            child.release();
        }

        let (action, value) =
            best.unwrap_or_else(|| (Action::None, self.evaluator.evaluate(&root.state)));
        debug!(
            ?action,
            value,
            nodes = self.stats.nodes_visited,
            cutoffs = self.stats.cutoffs,
            horizon_hits = self.stats.horizon_hits,
            "decision made"
        );

        Decision {
            action,
            value,
            depth,
            horizon_reached: self.stats.horizon_hits > 0,
            stats: self.stats,
        }
    }

    fn alpha_beta(
        &mut self,
        node: &mut GameTreeNode,
        depth: u32,
        mut alpha: f32,
        mut beta: f32,
    ) -> f32 {
        self.stats.nodes_visited += 1;

        if node.state.is_terminal() {
            return self.evaluator.evaluate(&node.state);
        }
        if depth == 0 {
            self.stats.horizon_hits += 1;
            return self.evaluator.evaluate(&node.state);
        }

        let maximizing = node.state.turn() == Side::Protagonist;
        let mut value = if maximizing {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        };

        for child in node.children() {
            let score = self.alpha_beta(child, depth - 1, alpha, beta);
            child.release();
            if maximizing {
                value = value.max(score);
                alpha = alpha.max(value);
            } else {
                value = value.min(score);
                beta = beta.min(value);
            }
            if self.config.pruning && alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::infra::Position;
    use crate::state::{CellTag, Grid, HazardMoves};

    fn state(rows: &[&str]) -> GameState {
        let grid = Grid::from_rows(rows).unwrap();
        let spawn = grid.spawn().unwrap();
        let goal = grid.goal().unwrap();
        GameState::from_grid(Rc::new(grid), spawn, goal).unwrap()
    }

    #[test]
    fn test_terminal_root_yields_no_action() {
        let mut boxed = state(&["#H#G", "#P#.", "####"]);
        boxed.add_bomb(Position::new(1, 1), 3, 1);
        assert!(boxed.is_terminal());

        let mut search = AlphaBetaSearch::new(AlphaBetaConfig::default());
        let decision = search.decide(boxed, 3, true);
        assert_eq!(decision.action, Action::None);
        assert_eq!(decision.stats.nodes_visited, 1);
        assert!(decision.status().is_ok());
    }

    #[test]
    fn test_avoids_stepping_next_to_hazard() {
        // Right is greedy for the goal but lands next to the hazard
        let s = state(&["...H.", "..P.G"]);
        for depth in 1..=4 {
            let mut search = AlphaBetaSearch::new(AlphaBetaConfig::default());
            let action = search.run(s.clone(), depth, true);
            assert_ne!(action, Action::Move(Position::new(3, 0)), "depth {}", depth);
            assert_ne!(action, Action::Move(Position::new(2, 1)), "depth {}", depth);
        }

        let mut search = AlphaBetaSearch::new(AlphaBetaConfig::default());
        let decision = search.decide(s, 2, true);
        assert_eq!(decision.action, Action::Move(Position::new(1, 0)));
        assert_eq!(decision.value, -300.0);
        assert_eq!(
            decision.status(),
            Err(SearchError::DepthExceeded { depth: 2 })
        );
    }

    #[test]
    fn test_takes_the_goal_when_adjacent() {
        let s = state(&["H..", ".PG"]);
        let mut search = AlphaBetaSearch::new(AlphaBetaConfig::default());
        let decision = search.decide(s, 3, true);
        assert_eq!(decision.action, Action::Move(Position::new(2, 0)));
        assert_eq!(decision.value, f32::INFINITY);
    }

    #[test]
    fn test_places_bomb_when_walled_in_by_rock() {
        let s = state(&["P%G"]);
        let mut search = AlphaBetaSearch::new(AlphaBetaConfig::default());
        assert_eq!(search.run(s, 2, true), Action::PlaceBomb);
    }

    #[test]
    fn test_hazard_side_minimizes() {
        let s = state(&["PH.", "..G"]);
        let mut search = AlphaBetaSearch::new(AlphaBetaConfig::default());
        let decision = search.decide(s, 1, false);
        assert_eq!(decision.action, Action::Move(Position::new(0, 1)));
        assert_eq!(decision.value, f32::NEG_INFINITY);
    }

    #[test]
    fn test_cornered_protagonist_has_no_decision() {
        let cornered = state(&["#H#G", "#P#.", "####"]);
        let mut search = AlphaBetaSearch::new(AlphaBetaConfig::default());
        assert!(cornered.is_terminal());
        let decision = search.decide(cornered, 2, true);
        assert_eq!(decision.action, Action::None);
        assert!(decision.value.is_finite());
        assert_eq!(decision.stats.nodes_visited, 1);
    }

    #[test]
    fn test_joint_hazard_decision_names_the_lead_move() {
        let s = state(&["PH.", "..G"]).with_hazard_moves(HazardMoves::Joint);
        let mut search = AlphaBetaSearch::new(AlphaBetaConfig::default());
        let decision = search.decide(s, 1, false);
        assert_eq!(decision.action, Action::Move(Position::new(0, 1)));
        assert_eq!(decision.value, f32::NEG_INFINITY);
    }

    #[test]
    fn test_pruning_matches_plain_minimax() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..25 {
            let mut grid = Grid::new(6, 6);
            for x in 0..6 {
                for y in 0..6 {
                    let roll: f64 = rng.random();
                    if roll < 0.15 {
                        grid.add_tag(Position::new(x, y), CellTag::IndestructibleObstacle);
                    } else if roll < 0.3 {
                        grid.add_tag(Position::new(x, y), CellTag::DestructibleObstacle);
                    }
                }
            }
            let start = Position::new(rng.random_range(0..6), rng.random_range(0..6));
            let goal = Position::new(rng.random_range(0..6), rng.random_range(0..6));
            grid.set(start, Default::default());
            let mut s = GameState::from_grid(Rc::new(grid), start, goal).unwrap();
            for _ in 0..2 {
                let hazard = Position::new(rng.random_range(0..6), rng.random_range(0..6));
                let open = !s.is_indestructible(hazard) && !s.is_intact_rock(hazard);
                if open && hazard != start && s.generate_moves(hazard).len() > 1 {
                    s.add_hazard(hazard);
                }
            }

            let depth = 4;
            let mut pruned = AlphaBetaSearch::new(AlphaBetaConfig::default());
            let mut plain = AlphaBetaSearch::new(AlphaBetaConfig::default().with_pruning(false));
            let a = pruned.decide(s.clone(), depth, true);
            let b = plain.decide(s, depth, true);

            assert_eq!(a.action, b.action);
            assert_eq!(a.value, b.value);
            assert!(a.stats.nodes_visited <= b.stats.nodes_visited);
            assert_eq!(b.stats.cutoffs, 0);
        }
    }

    #[test]
    fn test_custom_evaluator() {
        struct PreferUp;
        impl Evaluator for PreferUp {
            fn evaluate(&self, state: &GameState) -> f32 {
                state.protagonist().map_or(f32::NEG_INFINITY, |pos| pos.y as f32)
            }
        }

        let s = state(&["...", ".P.", "..G"]);
        let mut search =
            AlphaBetaSearch::with_evaluator(AlphaBetaConfig::default(), Box::new(PreferUp));
        assert_eq!(search.run(s, 1, true), Action::Move(Position::new(1, 2)));
    }
}
