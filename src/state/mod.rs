mod game_state;
mod grid;

pub use game_state::{
    Action, Actor, Bomb, DEFAULT_BLAST_RADIUS, DEFAULT_HISTORY_WINDOW, GameState, Hazard,
    HazardMoves, Ply, Side,
};
pub use grid::{CellTag, CellTags, Grid, GridView, Passability};
