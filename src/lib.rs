//! Fifteen - a sliding-tile puzzle with an on-demand render loop
//!
//! Core modules:
//! - `puzzle`: Board state machine (tiles, shuffle, moves, animation)
//! - `scheduler`: Coalescing frame scheduler exposing frames as a `Stream`
//! - `app`: Controller tying input, puzzle and scheduler together
//! - `pick`: Camera and ray casting against tile boxes
//! - `platform`: Frame hosts (manual for headless, requestAnimationFrame on web)
//! - `renderer`: Render surfaces (ASCII log, 2D canvas)
//! - `persistence`: Versioned board saves

pub mod app;
pub mod error;
pub mod persistence;
pub mod pick;
pub mod platform;
pub mod puzzle;
pub mod renderer;
pub mod scheduler;
pub mod settings;

pub use app::{Controller, LoopState, RenderSurface};
pub use error::{ConfigError, MoveError};
pub use puzzle::{PuzzleField, Tile, TileId};
pub use scheduler::{FrameHost, FrameScheduler, FrameToken};
pub use settings::Settings;

/// Puzzle configuration constants
pub mod consts {
    /// Board side length of the classic 15-puzzle
    pub const DEFAULT_WIDTH: usize = 4;
    /// Smallest board that still has a move to make
    pub const MIN_WIDTH: usize = 2;
    /// Largest board the layout and shuffle are tuned for
    pub const MAX_WIDTH: usize = 8;

    /// Tile footprint on the board plane (world units)
    pub const TILE_EXTENT: f32 = 1.0;
    /// Tile thickness along the vertical axis
    pub const TILE_HEIGHT: f32 = 0.1;
    /// Gap between neighbouring tiles
    pub const TILE_GUTTER: f32 = 0.1;

    /// Time (ms) over which the remaining distance is covered at full rate
    pub const ANIMATION_DURATION_MS: f64 = 100.0;
    /// Per-axis distance under which a tile counts as settled
    pub const SETTLE_EPSILON: f32 = 1e-4;
}

/// Convert a pixel position inside a viewport to normalized device coordinates
///
/// x grows right and y grows up, both in [-1, 1].
#[inline]
pub fn pixels_to_ndc(x: f32, y: f32, viewport: (f32, f32)) -> glam::Vec2 {
    let (w, h) = viewport;
    if w <= 0.0 || h <= 0.0 {
        return glam::Vec2::ZERO;
    }
    glam::Vec2::new(x / w * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
}
