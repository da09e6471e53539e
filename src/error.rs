//! Error types
//!
//! Nothing here is fatal: configuration problems are clamped and logged,
//! refused moves surface as `false` to the caller.

use thiserror::Error;

/// Problems with board or settings configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("board width {requested} is not a whole number, using {used}")]
    FractionalWidth { requested: f64, used: usize },
    #[error("board width {requested} is outside {min}..={max}, using {used}")]
    WidthOutOfRange {
        requested: f64,
        min: usize,
        max: usize,
        used: usize,
    },
    #[error("board of width {width} needs {expected} tiles, got {actual}")]
    TileCount {
        width: usize,
        expected: usize,
        actual: usize,
    },
    #[error("tile values are not a permutation of 0..{0}")]
    NotAPermutation(usize),
    #[error("board layout cannot be solved")]
    Unsolvable,
    #[error("animation duration must be positive, got {0}")]
    AnimationDuration(f64),
    #[error("unsupported save version {0}")]
    SaveVersion(u32),
    #[error("malformed JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Why a move request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no tile {0} on this board")]
    UnknownTile(u32),
    #[error("the empty slot cannot be moved")]
    EmptySlot,
    #[error("tile at place {place} is not next to the empty slot at {empty}")]
    NotAdjacent { place: usize, empty: usize },
}
