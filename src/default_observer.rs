use bomberbot::infra::path_to_direction;
use bomberbot::{Action, GameState};
use tracing::{debug, info};

use crate::game::GameResult;
use crate::game_observer::GameObserver;

pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_game_start(&mut self, planner: &str, state: &GameState) {
        let terrain = state.terrain();
        info!("Game started with {}", planner);
        info!("- map size: {}x{}", terrain.width, terrain.height);
        info!("- hazards: {}", state.hazards().len());
        info!("- goal: {}", state.goal());
        info!("\n{}", state.draw_ascii());
    }

    fn on_state_update(&mut self, tick: usize, state: &GameState) {
        match state.protagonist() {
            Some(pos) => info!(
                "tick: {}, pos: {}, hazards: {}, bombs: {}",
                tick,
                pos,
                state.hazards().len(),
                state.bombs().len()
            ),
            None => info!("tick: {}, protagonist eliminated", tick),
        }
        debug!("\n{}", state.draw_ascii());
    }

    fn on_action_selected(&mut self, action: Action, state: &GameState) {
        let heading = match (action, state.protagonist()) {
            (Action::Move(next), Some(pos)) => path_to_direction(pos, &[next]),
            _ => None,
        };
        match heading {
            Some(direction) => info!("action: {:?} {:?}", action, direction),
            None => info!("action: {:?}", action),
        }
    }

    fn on_game_finished(&mut self, result: GameResult, final_tick: usize) {
        info!("Game finished: {:?}", result);
        info!("Final tick: {}", final_tick);
    }
}
