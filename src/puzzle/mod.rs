//! Sliding-tile puzzle state
//!
//! Pure board logic. This module must stay deterministic:
//! - Seeded RNG only
//! - Tiles ordered by place, never searched for the empty slot
//! - No rendering or platform dependencies (picking goes through `RayCaster`)

pub mod field;
pub mod layout;
pub mod tile;

pub use field::{BoardSnapshot, Move, PuzzleField, checked_width};
pub use layout::BoardLayout;
pub use tile::{Tile, TileId};
