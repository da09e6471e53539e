//! Text rendering for headless runs

use std::fmt::Write;

use crate::app::{FrameView, RenderSurface};
use crate::puzzle::{PuzzleField, TileId};

/// Draw the board as a grid of numbers, logical places only
///
/// The hovered tile is bracketed and sliding tiles carry a `*`.
pub fn board_to_string(field: &PuzzleField, hovered: Option<TileId>) -> String {
    let width = field.width();
    let cell = (field.layout().size() - 1).to_string().len() + 3;
    let mut out = String::new();
    for row in field.tiles().chunks(width) {
        for tile in row {
            let label = if tile.is_empty() {
                ".".to_string()
            } else if hovered == Some(tile.id()) {
                format!("[{}]", tile.value)
            } else if tile.is_moving() {
                format!("{}*", tile.value)
            } else {
                tile.value.to_string()
            };
            let _ = write!(out, "{:>cell$}", label, cell = cell);
        }
        out.push('\n');
    }
    out
}

/// Surface that keeps the latest frame as text and logs it
#[derive(Debug, Default)]
pub struct AsciiSurface {
    pub last_frame: String,
    pub frames_rendered: u64,
    pub size: (u32, u32),
}

impl RenderSurface for AsciiSurface {
    fn render_frame(&mut self, view: &FrameView<'_>) {
        self.frames_rendered += 1;
        self.last_frame = board_to_string(view.field, view.hovered);
        log::debug!(
            "frame {} at {:.1} ms, {} moves\n{}",
            self.frames_rendered,
            view.time,
            view.moves,
            self.last_frame
        );
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}
