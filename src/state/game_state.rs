use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write;
use std::rc::Rc;

use tracing::trace;

use crate::infra::{Direction, Position, SearchError};
use crate::state::{CellTag, CellTags, Grid, GridView};

pub const DEFAULT_BLAST_RADIUS: i32 = 1;
pub const DEFAULT_HISTORY_WINDOW: usize = 4;

/// Whose ply it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Protagonist,
    Hazards,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Protagonist => Side::Hazards,
            Side::Hazards => Side::Protagonist,
        }
    }
}

/// Decision handed back to the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Position),
    PlaceBomb,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Protagonist,
    Hazard(usize),
    /// Several hazards moved at once.
    Hazards,
}

/// The ply that produced a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ply {
    pub actor: Actor,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hazard {
    pub id: usize,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bomb {
    pub id: usize,
    pub position: Position,
    /// Hazard plies left before it explodes.
    pub fuse: u32,
    pub radius: i32,
}

/// How the hazards' ply branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HazardMoves {
    /// One hazard moves per ply; one child per (hazard, move).
    #[default]
    Single,
    /// Every hazard moves; one child per combination. The ply is recorded
    /// as the move of the lowest-id hazard, so a hazard-side decision names
    /// where that hazard goes.
    Joint,
}

/// Snapshot of an adversarial episode.
///
/// Terrain is shared behind an `Rc`; rocks destroyed in this branch live in
/// `cleared` and picked-up power-ups in `collected`, so clones stay cheap and
/// never touch the live grid.
#[derive(Debug, Clone)]
pub struct GameState {
    terrain: Rc<Grid>,
    cleared: HashSet<Position>,
    collected: HashSet<Position>,
    protagonist: Option<Position>,
    hazards: Vec<Hazard>,
    bombs: Vec<Bomb>,
    goal: Position,
    turn: Side,
    history: VecDeque<Position>,
    history_window: usize,
    blast_radius: i32,
    hazard_moves: HazardMoves,
    last_ply: Option<Ply>,
    next_bomb_id: usize,
}

impl GameState {
    /// Snapshot `terrain`, picking up hazards and bombs from its tags. Bombs
    /// found on the grid get a full fuse.
    pub fn from_grid(
        terrain: Rc<Grid>,
        protagonist: Position,
        goal: Position,
    ) -> Result<Self, SearchError> {
        if !terrain.in_bounds(protagonist) {
            return Err(SearchError::InvalidStart(protagonist));
        }
        if !terrain.in_bounds(goal) {
            return Err(SearchError::InvalidGoal(goal));
        }

        let hazards = terrain
            .positions_with(CellTag::Hazard)
            .into_iter()
            .enumerate()
            .map(|(id, position)| Hazard { id, position })
            .collect();
        let bombs: Vec<Bomb> = terrain
            .positions_with(CellTag::Bomb)
            .into_iter()
            .enumerate()
            .map(|(id, position)| Bomb {
                id,
                position,
                fuse: DEFAULT_BLAST_RADIUS as u32 + 1,
                radius: DEFAULT_BLAST_RADIUS,
            })
            .collect();
        let next_bomb_id = bombs.len();

        Ok(Self {
            terrain,
            cleared: HashSet::new(),
            collected: HashSet::new(),
            protagonist: Some(protagonist),
            hazards,
            bombs,
            goal,
            turn: Side::Protagonist,
            history: VecDeque::new(),
            history_window: DEFAULT_HISTORY_WINDOW,
            blast_radius: DEFAULT_BLAST_RADIUS,
            hazard_moves: HazardMoves::Single,
            last_ply: None,
            next_bomb_id,
        })
    }

    pub fn with_blast_radius(mut self, radius: i32) -> Self {
        self.blast_radius = radius.max(0);
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self.history.truncate(window);
        self
    }

    pub fn with_hazard_moves(mut self, hazard_moves: HazardMoves) -> Self {
        self.hazard_moves = hazard_moves;
        self
    }

    pub fn with_turn(mut self, turn: Side) -> Self {
        self.turn = turn;
        self
    }

    pub fn add_hazard(&mut self, position: Position) -> usize {
        let id = self.hazards.iter().map(|h| h.id + 1).max().unwrap_or(0);
        self.hazards.push(Hazard { id, position });
        id
    }

    pub fn add_bomb(&mut self, position: Position, fuse: u32, radius: i32) -> usize {
        let id = self.next_bomb_id;
        self.next_bomb_id += 1;
        self.bombs.push(Bomb {
            id,
            position,
            fuse,
            radius,
        });
        id
    }

    pub fn protagonist(&self) -> Option<Position> {
        self.protagonist
    }

    pub fn is_eliminated(&self) -> bool {
        self.protagonist.is_none()
    }

    pub fn at_goal(&self) -> bool {
        self.protagonist == Some(self.goal)
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn blast_radius(&self) -> i32 {
        self.blast_radius
    }

    pub fn last_ply(&self) -> Option<Ply> {
        self.last_ply
    }

    /// Recent protagonist positions, newest first.
    pub fn history(&self) -> impl Iterator<Item = &Position> {
        self.history.iter()
    }

    pub fn visited_recently(&self, pos: Position) -> bool {
        self.history.contains(&pos)
    }

    pub fn terrain(&self) -> &Grid {
        &self.terrain
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.terrain.in_bounds(pos)
    }

    pub fn is_indestructible(&self, pos: Position) -> bool {
        self.terrain
            .cell_tags(pos)
            .contains(CellTag::IndestructibleObstacle)
    }

    /// Destructible obstacle not yet cleared in this branch.
    pub fn is_intact_rock(&self, pos: Position) -> bool {
        self.terrain
            .cell_tags(pos)
            .contains(CellTag::DestructibleObstacle)
            && !self.cleared.contains(&pos)
    }

    pub fn is_cleared(&self, pos: Position) -> bool {
        self.cleared.contains(&pos)
    }

    /// Power-up lying open at `pos`. One hidden under a rock shows up once
    /// the rock is cleared.
    pub fn has_power_up(&self, pos: Position) -> bool {
        self.terrain.cell_tags(pos).contains(CellTag::PowerUp)
            && !self.is_intact_rock(pos)
            && !self.collected.contains(&pos)
    }

    pub fn has_bomb(&self, pos: Position) -> bool {
        self.bombs.iter().any(|bomb| bomb.position == pos)
    }

    pub fn has_hazard(&self, pos: Position) -> bool {
        self.hazards.iter().any(|hazard| hazard.position == pos)
    }

    fn is_open(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && !self.is_indestructible(pos)
            && !self.is_intact_rock(pos)
            && !self.has_bomb(pos)
    }

    /// Protagonist moves from `pos`, canonical order.
    pub fn generate_moves(&self, pos: Position) -> Vec<Position> {
        pos.neighbors()
            .into_iter()
            .filter(|next| self.is_open(*next) && !self.has_hazard(*next))
            .collect()
    }

    /// Moves of the hazard at `pos`. Same rules as the protagonist's: the
    /// protagonist's cell is open to a hazard, another hazard's is not.
    pub fn hazard_moves(&self, pos: Position) -> Vec<Position> {
        self.generate_moves(pos)
    }

    /// Cells a bomb at `center` would hit, center first.
    pub fn blast_line(&self, center: Position, radius: i32) -> Vec<Position> {
        let mut cells = vec![center];
        for direction in Direction::ORTHOGONAL {
            let mut pos = center;
            for _ in 0..radius {
                pos = pos.step(direction);
                if !self.in_bounds(pos) || self.is_indestructible(pos) {
                    break;
                }
                cells.push(pos);
                if self.is_intact_rock(pos) {
                    break;
                }
            }
        }
        cells
    }

    pub fn bomb_risk(&self, pos: Position) -> bool {
        self.bombs
            .iter()
            .any(|bomb| self.blast_line(bomb.position, bomb.radius).contains(&pos))
    }

    pub fn can_place_bomb(&self) -> bool {
        self.protagonist.is_some() && self.bombs.is_empty()
    }

    /// Whether a bomb dropped by the protagonist now would hit a rock or a
    /// hazard.
    pub fn is_bomb_useful(&self) -> bool {
        let Some(pos) = self.protagonist else {
            return false;
        };
        self.blast_line(pos, self.blast_radius)
            .into_iter()
            .any(|cell| self.is_intact_rock(cell) || self.has_hazard(cell))
    }

    fn bomb_action_available(&self) -> bool {
        self.can_place_bomb() && self.is_bomb_useful()
    }

    pub fn is_terminal(&self) -> bool {
        let Some(pos) = self.protagonist else {
            return true;
        };
        if pos == self.goal {
            return true;
        }
        if !self.generate_moves(pos).is_empty() {
            return false;
        }
        // Boxed in: a neighbouring hazard gets there before any bomb helps
        let cornered = self.hazards.iter().any(|hazard| hazard.position.is_adjacent(&pos));
        cornered || !self.bomb_action_available()
    }

    /// One successor per legal action of the side to move.
    pub fn get_children(&self) -> Vec<GameState> {
        if self.is_terminal() {
            return Vec::new();
        }
        match self.turn {
            Side::Protagonist => self.protagonist_children(),
            Side::Hazards => self.hazard_children(),
        }
    }

    /// The child reached by the protagonist taking `action`, if legal.
    pub fn successor(&self, action: Action) -> Option<GameState> {
        if self.turn != Side::Protagonist {
            return None;
        }
        self.get_children()
            .into_iter()
            .find(|child| child.last_ply.map(|ply| ply.action) == Some(action))
    }

    fn protagonist_children(&self) -> Vec<GameState> {
        let Some(pos) = self.protagonist else {
            return Vec::new();
        };

        let mut children: Vec<GameState> = self
            .generate_moves(pos)
            .into_iter()
            .map(|next| {
                let mut child = self.clone();
                child.remember(pos);
                child.protagonist = Some(next);
                child.collect_power_up(next);
                child.finish_ply(Actor::Protagonist, Action::Move(next));
                child
            })
            .collect();

        if self.bomb_action_available() {
            let mut child = self.clone();
            // One round longer than a grid bomb so a corner can be reached
            child.add_bomb(pos, self.blast_radius as u32 + 2, self.blast_radius);
            child.finish_ply(Actor::Protagonist, Action::PlaceBomb);
            children.push(child);
        }

        if children.is_empty() {
            let mut pass = self.clone();
            pass.finish_ply(Actor::Protagonist, Action::None);
            children.push(pass);
        }
        children
    }

    fn hazard_children(&self) -> Vec<GameState> {
        let mut children = Vec::new();
        match self.hazard_moves {
            HazardMoves::Single => {
                for (index, hazard) in self.hazards.iter().enumerate() {
                    for next in self.hazard_moves(hazard.position) {
                        let mut child = self.clone();
                        child.hazards[index].position = next;
                        child.finish_ply(Actor::Hazard(hazard.id), Action::Move(next));
                        children.push(child);
                    }
                }
            }
            HazardMoves::Joint => {
                for targets in self.joint_targets() {
                    let mut child = self.clone();
                    for (hazard, target) in child.hazards.iter_mut().zip(&targets) {
                        hazard.position = *target;
                    }
                    let lead = targets.first().copied().map_or(Action::None, Action::Move);
                    child.finish_ply(Actor::Hazards, lead);
                    children.push(child);
                }
            }
        }

        if children.is_empty() {
            let mut pass = self.clone();
            pass.finish_ply(Actor::Hazards, Action::None);
            children.push(pass);
        }
        children
    }

    /// Every assignment of targets to hazards with no two sharing a cell. A
    /// hazard with no move stays put.
    fn joint_targets(&self) -> Vec<Vec<Position>> {
        if self.hazards.is_empty() {
            return Vec::new();
        }
        let mut combos: Vec<Vec<Position>> = vec![Vec::new()];
        for hazard in &self.hazards {
            let mut options = self.hazard_moves(hazard.position);
            if options.is_empty() {
                options.push(hazard.position);
            }
            combos = combos
                .into_iter()
                .flat_map(|combo| {
                    options.iter().filter_map(move |target| {
                        if combo.contains(target) {
                            return None;
                        }
                        let mut next = combo.clone();
                        next.push(*target);
                        Some(next)
                    })
                })
                .collect();
        }
        combos
    }

    fn collect_power_up(&mut self, pos: Position) {
        if self.has_power_up(pos) {
            self.collected.insert(pos);
            self.blast_radius += 1;
            trace!(radius = self.blast_radius, "power-up collected at {}", pos);
        }
    }

    fn remember(&mut self, pos: Position) {
        self.history.push_front(pos);
        self.history.truncate(self.history_window);
    }

    fn finish_ply(&mut self, actor: Actor, action: Action) {
        self.last_ply = Some(Ply { actor, action });
        if self.turn == Side::Hazards {
            self.resolve_round();
        }
        self.turn = self.turn.other();
    }

    /// End of the hazards' ply: contact kills, then fuses burn down.
    fn resolve_round(&mut self) {
        if self.protagonist.is_some_and(|pos| self.has_hazard(pos)) {
            trace!("protagonist caught by a hazard");
            self.protagonist = None;
        }

        for bomb in &mut self.bombs {
            bomb.fuse = bomb.fuse.saturating_sub(1);
        }
        let (exploding, pending): (Vec<Bomb>, Vec<Bomb>) =
            self.bombs.iter().partition(|bomb| bomb.fuse == 0);
        self.bombs = pending;

        for bomb in exploding {
            let blast = self.blast_line(bomb.position, bomb.radius);
            trace!(bomb = bomb.id, cells = blast.len(), "bomb exploded at {}", bomb.position);
            if self.protagonist.is_some_and(|pos| blast.contains(&pos)) {
                self.protagonist = None;
            }
            self.hazards.retain(|hazard| !blast.contains(&hazard.position));
            for cell in blast {
                if self.is_intact_rock(cell) {
                    self.cleared.insert(cell);
                }
            }
        }
    }

    /// First move from `pos`, in canonical order, outside every blast line.
    pub fn find_safe_position(&self, pos: Position) -> Option<Position> {
        self.generate_moves(pos)
            .into_iter()
            .find(|next| !self.bomb_risk(*next))
    }

    /// Shortest walk from `from` to `to` under the protagonist's move rules,
    /// `from` excluded.
    pub fn path_between(&self, from: Position, to: Position) -> Option<Vec<Position>> {
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        let mut seen = HashSet::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = Vec::new();
                let mut pos = current;
                while pos != from {
                    path.push(pos);
                    pos = *came_from.get(&pos)?;
                }
                path.reverse();
                return Some(path);
            }
            for next in self.generate_moves(current) {
                if seen.insert(next) {
                    came_from.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// ASCII view in the layout legend, with the protagonist drawn as `P`.
    pub fn draw_ascii(&self) -> String {
        let mut out = String::new();
        for y in (0..self.terrain.height).rev() {
            for x in 0..self.terrain.width {
                let pos = Position::new(x, y);
                let symbol = if self.protagonist == Some(pos) {
                    'P'
                } else if self.has_hazard(pos) {
                    'H'
                } else if self.has_bomb(pos) {
                    'B'
                } else if self.is_indestructible(pos) {
                    '#'
                } else if self.is_intact_rock(pos) {
                    '%'
                } else if pos == self.goal {
                    'G'
                } else if self.has_power_up(pos) {
                    '+'
                } else {
                    '.'
                };
                out.push(symbol);
            }
            let _ = writeln!(out);
        }
        out
    }
}

/// Live view for single-agent searches: terrain with this branch's cleared
/// rocks removed and the current hazards and bombs tagged in.
impl GridView for GameState {
    fn width(&self) -> i32 {
        self.terrain.width
    }

    fn height(&self) -> i32 {
        self.terrain.height
    }

    fn cell_tags(&self, pos: Position) -> CellTags {
        let mut tags = self.terrain.cell_tags(pos);
        if self.cleared.contains(&pos) {
            tags.remove(CellTag::DestructibleObstacle);
        }
        if self.collected.contains(&pos) {
            tags.remove(CellTag::PowerUp);
        }
        for tag in [CellTag::Hazard, CellTag::Bomb] {
            tags.remove(tag);
        }
        if self.has_hazard(pos) {
            tags.insert(CellTag::Hazard);
        }
        if self.has_bomb(pos) {
            tags.insert(CellTag::Bomb);
        }
        tags
    }
}
