use crate::state::GameState;

/// Scores a state from the protagonist's point of view; higher is better.
pub trait Evaluator {
    fn evaluate(&self, state: &GameState) -> f32;
}

/// Penalty weights of [`WeightedEvaluator`]. These are tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationWeights {
    /// Per step of Manhattan distance to the goal.
    pub goal_distance: f32,
    pub bomb_risk: f32,
    pub hazard_proximity: f32,
    /// Manhattan distance at which a hazard counts as close.
    pub proximity_radius: i32,
    pub revisit: f32,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        Self {
            goal_distance: 100.0,
            bomb_risk: 500.0,
            hazard_proximity: 300.0,
            proximity_radius: 1,
            revisit: 50.0,
        }
    }
}

impl EvaluationWeights {
    pub fn with_goal_distance(mut self, weight: f32) -> Self {
        self.goal_distance = weight;
        self
    }

    pub fn with_bomb_risk(mut self, weight: f32) -> Self {
        self.bomb_risk = weight;
        self
    }

    pub fn with_hazard_proximity(mut self, weight: f32, radius: i32) -> Self {
        self.hazard_proximity = weight;
        self.proximity_radius = radius;
        self
    }

    pub fn with_revisit(mut self, weight: f32) -> Self {
        self.revisit = weight;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedEvaluator {
    pub weights: EvaluationWeights,
}

impl WeightedEvaluator {
    pub fn new(weights: EvaluationWeights) -> Self {
        Self { weights }
    }
}

impl Evaluator for WeightedEvaluator {
    fn evaluate(&self, state: &GameState) -> f32 {
        let Some(pos) = state.protagonist() else {
            return f32::NEG_INFINITY;
        };
        if state.at_goal() {
            return f32::INFINITY;
        }

        let w = &self.weights;
        let mut score = -w.goal_distance * pos.distance(&state.goal()) as f32;

        if state.bomb_risk(pos) {
            score -= w.bomb_risk;
        }
        if state
            .hazards()
            .iter()
            .any(|hazard| hazard.position.distance(&pos) <= w.proximity_radius)
        {
            score -= w.hazard_proximity;
        }
        if state.visited_recently(pos) {
            score -= w.revisit;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::infra::Position;
    use crate::state::{Grid, Side};

    fn state(rows: &[&str]) -> GameState {
        let grid = Grid::from_rows(rows).unwrap();
        let spawn = grid.spawn().unwrap();
        let goal = grid.goal().unwrap();
        GameState::from_grid(Rc::new(grid), spawn, goal).unwrap()
    }

    #[test]
    fn test_terminal_scores_are_infinite() {
        let evaluator = WeightedEvaluator::default();
        let s = state(&["PH.G", "...."]);
        assert!(evaluator.evaluate(&s).is_finite());

        let caught = s
            .with_turn(Side::Hazards)
            .get_children()
            .into_iter()
            .find(GameState::is_eliminated)
            .unwrap();
        assert_eq!(evaluator.evaluate(&caught), f32::NEG_INFINITY);

        let grid = Grid::from_rows(&["..G"]).unwrap();
        let won = GameState::from_grid(Rc::new(grid), Position::new(2, 0), Position::new(2, 0))
            .unwrap();
        assert_eq!(evaluator.evaluate(&won), f32::INFINITY);
    }

    #[test]
    fn test_penalties_add_up() {
        let evaluator = WeightedEvaluator::default();
        let calm = state(&["P...G"]);
        assert_eq!(evaluator.evaluate(&calm), -400.0);

        let crowded = state(&["PH..G"]);
        assert_eq!(evaluator.evaluate(&crowded), -700.0);

        let mut risky = state(&["P...G"]);
        risky.add_bomb(Position::new(1, 0), 3, 1);
        assert_eq!(evaluator.evaluate(&risky), -900.0);

        let custom = WeightedEvaluator::new(
            EvaluationWeights::default()
                .with_goal_distance(1.0)
                .with_hazard_proximity(10.0, 2),
        );
        let near = state(&["P.H.G"]);
        assert_eq!(custom.evaluate(&near), -14.0);
    }
}
