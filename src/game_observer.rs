use bomberbot::{Action, GameState};

use crate::game::GameResult;

/// Trait for observing a demo run
pub trait GameObserver {
    /// Called once before the first tick
    fn on_game_start(&mut self, planner: &str, state: &GameState);

    /// Called after every tick that changed the world
    fn on_state_update(&mut self, tick: usize, state: &GameState);

    /// Called when the protagonist commits to an action
    fn on_action_selected(&mut self, action: Action, state: &GameState);

    /// Called when the run ends
    fn on_game_finished(&mut self, result: GameResult, final_tick: usize);
}
