use std::collections::HashMap;
use std::fmt::Write;

use crate::infra::{Position, SearchError};

/// What can occupy a cell. A cell may carry several tags at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellTag {
    Empty,
    DestructibleObstacle,
    IndestructibleObstacle,
    Goal,
    Hazard,
    Bomb,
    PowerUp,
}

impl CellTag {
    const ALL: [CellTag; 7] = [
        CellTag::Empty,
        CellTag::DestructibleObstacle,
        CellTag::IndestructibleObstacle,
        CellTag::Goal,
        CellTag::Hazard,
        CellTag::Bomb,
        CellTag::PowerUp,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Whether an agent may walk onto a cell holding only this tag.
    pub const fn is_passable(self) -> bool {
        matches!(
            self,
            CellTag::Empty | CellTag::Goal | CellTag::Hazard | CellTag::PowerUp
        )
    }

    pub const fn is_destructible(self) -> bool {
        matches!(self, CellTag::DestructibleObstacle)
    }

    pub const fn is_lethal(self) -> bool {
        matches!(self, CellTag::Hazard)
    }

    pub const fn blocks_blast(self) -> bool {
        matches!(self, CellTag::IndestructibleObstacle)
    }
}

/// How single-agent searches treat destructible obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Passability {
    /// Destructible obstacles are traversable; the agent blasts through them.
    #[default]
    BombAssisted,
    /// Only cells that are walkable right now.
    OpenOnly,
}

/// Set of [`CellTag`]s on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellTags(u8);

impl CellTags {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn of(tag: CellTag) -> Self {
        Self(tag.bit())
    }

    pub fn contains(&self, tag: CellTag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn insert(&mut self, tag: CellTag) {
        self.0 |= tag.bit();
    }

    pub fn remove(&mut self, tag: CellTag) {
        self.0 &= !tag.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = CellTag> + '_ {
        CellTag::ALL.into_iter().filter(|tag| self.contains(*tag))
    }

    pub fn is_passable(&self, rule: Passability) -> bool {
        self.iter().all(|tag| {
            tag.is_passable() || (rule == Passability::BombAssisted && tag.is_destructible())
        })
    }

    pub fn is_destructible(&self) -> bool {
        self.iter().any(CellTag::is_destructible)
    }

    pub fn is_lethal(&self) -> bool {
        self.iter().any(CellTag::is_lethal)
    }

    pub fn blocks_blast(&self) -> bool {
        self.iter().any(CellTag::blocks_blast)
    }
}

impl FromIterator<CellTag> for CellTags {
    fn from_iter<I: IntoIterator<Item = CellTag>>(iter: I) -> Self {
        let mut tags = CellTags::empty();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// Read-only queries a search needs from the environment.
pub trait GridView {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width() && pos.y >= 0 && pos.y < self.height()
    }

    /// Tags at `pos`. Out-of-bounds and unset cells report no tags.
    fn cell_tags(&self, pos: Position) -> CellTags;
}

/// In-memory multi-occupancy grid.
#[derive(Clone, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: HashMap<Position, CellTags>,
    spawn: Option<Position>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: HashMap::new(),
            spawn: None,
        }
    }

    /// Build a grid from ASCII rows, top row first.
    ///
    /// Legend: `.` empty, `#` indestructible, `%` destructible, `G` goal,
    /// `H` hazard, `B` bomb, `+` power-up, `P` protagonist spawn.
    pub fn from_rows(rows: &[&str]) -> Result<Self, SearchError> {
        let height = rows.len() as i32;
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0) as i32;
        if width == 0 {
            return Err(SearchError::InvalidLayout("layout has no cells".to_string()));
        }

        let mut grid = Grid::new(width, height);
        for (row_index, row) in rows.iter().enumerate() {
            if row.chars().count() as i32 != width {
                return Err(SearchError::InvalidLayout(format!(
                    "row {} has {} cells, expected {}",
                    row_index,
                    row.chars().count(),
                    width
                )));
            }
            let y = height - 1 - row_index as i32;
            for (x, symbol) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y);
                let tag = match symbol {
                    '.' => CellTag::Empty,
                    '#' => CellTag::IndestructibleObstacle,
                    '%' => CellTag::DestructibleObstacle,
                    'G' => CellTag::Goal,
                    'H' => CellTag::Hazard,
                    'B' => CellTag::Bomb,
                    '+' => CellTag::PowerUp,
                    'P' => {
                        grid.spawn = Some(pos);
                        CellTag::Empty
                    }
                    other => {
                        return Err(SearchError::InvalidLayout(format!(
                            "unknown symbol '{}' at {}",
                            other, pos
                        )));
                    }
                };
                grid.add_tag(pos, tag);
            }
        }
        Ok(grid)
    }

    pub fn get(&self, pos: &Position) -> Option<&CellTags> {
        self.cells.get(pos)
    }

    pub fn set(&mut self, pos: Position, tags: CellTags) -> Option<CellTags> {
        self.cells.insert(pos, tags)
    }

    pub fn add_tag(&mut self, pos: Position, tag: CellTag) {
        self.cells.entry(pos).or_default().insert(tag);
    }

    pub fn remove_tag(&mut self, pos: Position, tag: CellTag) {
        if let Some(tags) = self.cells.get_mut(&pos) {
            tags.remove(tag);
        }
    }

    /// Protagonist spawn marked in the layout.
    pub fn spawn(&self) -> Option<Position> {
        self.spawn
    }

    pub fn set_spawn(&mut self, pos: Position) {
        self.spawn = Some(pos);
    }

    /// All positions carrying `tag`, sorted for deterministic iteration.
    pub fn positions_with(&self, tag: CellTag) -> Vec<Position> {
        let mut positions: Vec<Position> = self
            .cells
            .iter()
            .filter(|(_, tags)| tags.contains(tag))
            .map(|(pos, _)| *pos)
            .collect();
        positions.sort();
        positions
    }

    pub fn goal(&self) -> Option<Position> {
        self.positions_with(CellTag::Goal).into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &CellTags)> {
        self.cells.iter()
    }

    /// Render the grid with the same legend `from_rows` reads, optionally
    /// overlaying `marks` (e.g. a path) with `*`.
    pub fn draw_ascii(&self, marks: &[Position]) -> String {
        let mut out = String::new();
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                let tags = self.cell_tags(pos);
                let symbol = if tags.contains(CellTag::IndestructibleObstacle) {
                    '#'
                } else if tags.contains(CellTag::DestructibleObstacle) {
                    '%'
                } else if tags.contains(CellTag::Bomb) {
                    'B'
                } else if tags.contains(CellTag::Hazard) {
                    'H'
                } else if tags.contains(CellTag::Goal) {
                    'G'
                } else if self.spawn == Some(pos) {
                    'P'
                } else if marks.contains(&pos) {
                    '*'
                } else if tags.contains(CellTag::PowerUp) {
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

impl GridView for Grid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn cell_tags(&self, pos: Position) -> CellTags {
        self.cells.get(&pos).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_places_tags_with_y_up() {
        let grid = Grid::from_rows(&["G.#", "P%H"]).unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.goal(), Some(Position::new(0, 1)));
        assert_eq!(grid.spawn(), Some(Position::new(0, 0)));
        assert!(grid
            .cell_tags(Position::new(2, 1))
            .contains(CellTag::IndestructibleObstacle));
        assert!(grid.cell_tags(Position::new(1, 0)).is_destructible());
        assert!(grid.cell_tags(Position::new(2, 0)).is_lethal());
    }

    #[test]
    fn test_from_rows_rejects_bad_layouts() {
        assert!(matches!(
            Grid::from_rows(&["..", "."]),
            Err(SearchError::InvalidLayout(_))
        ));
        assert!(matches!(
            Grid::from_rows(&[".x"]),
            Err(SearchError::InvalidLayout(_))
        ));
        assert!(matches!(Grid::from_rows(&[]), Err(SearchError::InvalidLayout(_))));
    }

    #[test]
    fn test_passability_rules() {
        let rock = CellTags::of(CellTag::DestructibleObstacle);
        let metal = CellTags::of(CellTag::IndestructibleObstacle);
        let hazard_on_goal: CellTags = [CellTag::Goal, CellTag::Hazard].into_iter().collect();

        assert!(rock.is_passable(Passability::BombAssisted));
        assert!(!rock.is_passable(Passability::OpenOnly));
        assert!(!metal.is_passable(Passability::BombAssisted));
        assert!(!CellTags::of(CellTag::Bomb).is_passable(Passability::BombAssisted));
        assert!(hazard_on_goal.is_passable(Passability::OpenOnly));
        assert!(CellTags::empty().is_passable(Passability::OpenOnly));
    }

    #[test]
    fn test_out_of_bounds_queries() {
        let grid = Grid::new(2, 2);
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert!(!grid.in_bounds(Position::new(0, 2)));
        assert!(grid.cell_tags(Position::new(5, 5)).is_empty());
    }

    #[test]
    fn test_tag_edits_and_ascii_round_trip() {
        let rows = ["#G.", "%.H", "P+B"];
        let mut grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.draw_ascii(&[]), "#G.\n%.H\nP+B\n");

        grid.remove_tag(Position::new(0, 1), CellTag::DestructibleObstacle);
        grid.add_tag(Position::new(0, 1), CellTag::PowerUp);
        assert_eq!(
            grid.draw_ascii(&[Position::new(1, 1)]),
            "#G.\n+*H\nP+B\n"
        );
    }
}
