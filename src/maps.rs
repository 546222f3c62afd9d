use bomberbot::{Grid, SearchError};

const ARENA: &[&str] = &[
    "###########",
    "#P..%...%.#",
    "#.#.#%#.#.#",
    "#...%.H...#",
    "#%#.#.#.#%#",
    "#.%...%..G#",
    "###########",
];

const OPEN: &[&str] = &[
    "..........",
    ".P........",
    "..........",
    "....H.....",
    "..........",
    "........G.",
];

const MAZE: &[&str] = &[
    "#########",
    "#P#.....#",
    "#.#.###.#",
    "#...#...#",
    "###.#.#%#",
    "#.....#G#",
    "#########",
];

pub const NAMES: [&str; 3] = ["arena", "open", "maze"];

/// Built-in layout by name, in the `Grid::from_rows` legend.
pub fn load(name: &str) -> Result<Grid, SearchError> {
    let rows = match name.trim().to_ascii_lowercase().as_str() {
        "arena" => ARENA,
        "open" => OPEN,
        "maze" => MAZE,
        other => {
            return Err(SearchError::InvalidLayout(format!(
                "unknown map '{}' (expected one of: {})",
                other,
                NAMES.join(", ")
            )));
        }
    };
    Grid::from_rows(rows)
}
