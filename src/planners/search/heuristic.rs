use std::f64::consts::SQRT_2;
use std::fmt;
use std::str::FromStr;

use super::{DIAGONAL_STEP_COST, Movement, ORTHOGONAL_STEP_COST};
use crate::infra::{Position, SearchError};

/// Distance estimate to the goal, in grid steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// Admissible for 4-directional movement.
    #[default]
    Manhattan,
    Euclidean,
}

impl Heuristic {
    pub fn distance(self, from: Position, to: Position) -> f64 {
        match self {
            Heuristic::Manhattan => f64::from(from.distance(&to)),
            Heuristic::Euclidean => from.euclidean(&to),
        }
    }

    /// Lower bound on the path cost to `to`, in step-cost units.
    ///
    /// With diagonal movement Manhattan becomes the octile distance and
    /// Euclidean is priced at the diagonal rate, so neither overestimates.
    pub fn cost_estimate(self, from: Position, to: Position, movement: Movement) -> f64 {
        let orthogonal = f64::from(ORTHOGONAL_STEP_COST);
        let diagonal = f64::from(DIAGONAL_STEP_COST);
        match (movement, self) {
            (Movement::Orthogonal, _) => self.distance(from, to) * orthogonal,
            (Movement::Diagonal, Heuristic::Manhattan) => {
                let dx = (from.x - to.x).abs();
                let dy = (from.y - to.y).abs();
                f64::from(dx.min(dy)) * diagonal + f64::from(dx.max(dy) - dx.min(dy)) * orthogonal
            }
            (Movement::Diagonal, Heuristic::Euclidean) => from.euclidean(&to) * diagonal / SQRT_2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Heuristic::Manhattan => "Manhattan",
            Heuristic::Euclidean => "Euclidean",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Heuristic {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manhattan" => Ok(Heuristic::Manhattan),
            "euclidean" => Ok(Heuristic::Euclidean),
            _ => Err(SearchError::UnknownHeuristic(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_heuristic() {
        assert_eq!("Manhattan".parse::<Heuristic>(), Ok(Heuristic::Manhattan));
        assert_eq!(" euclidean ".parse::<Heuristic>(), Ok(Heuristic::Euclidean));
        assert_eq!(
            "chebyshev".parse::<Heuristic>(),
            Err(SearchError::UnknownHeuristic("chebyshev".to_string()))
        );
    }

    #[test]
    fn test_cost_estimate_per_movement() {
        let from = Position::new(0, 0);
        let to = Position::new(3, 1);
        let manhattan = Heuristic::Manhattan;
        assert_eq!(manhattan.cost_estimate(from, to, Movement::Orthogonal), 40.0);
        // One diagonal then two straight steps
        assert_eq!(manhattan.cost_estimate(from, to, Movement::Diagonal), 33.0);

        let one_diagonal = Heuristic::Euclidean.cost_estimate(
            from,
            Position::new(1, 1),
            Movement::Diagonal,
        );
        assert!((one_diagonal - 13.0).abs() < 1e-9);
        assert!(
            Heuristic::Euclidean.cost_estimate(from, to, Movement::Diagonal)
                <= manhattan.cost_estimate(from, to, Movement::Diagonal)
        );
    }

    #[test]
    fn test_euclidean_never_exceeds_manhattan() {
        let goal = Position::new(7, 3);
        for x in -2..10 {
            for y in -2..6 {
                let pos = Position::new(x, y);
                assert!(
                    Heuristic::Euclidean.distance(pos, goal)
                        <= Heuristic::Manhattan.distance(pos, goal) + 1e-9
                );
            }
        }
    }
}
