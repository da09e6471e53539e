//! A single tile and its slide animation

use glam::Vec2;

use super::layout::BoardLayout;
use crate::consts::SETTLE_EPSILON;

/// Stable handle for a tile: its face value (0 is the empty slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

/// A tile entity
#[derive(Debug, Clone)]
pub struct Tile {
    pub value: u32,
    /// Logical board slot
    pub place: usize,
    /// Rendered position on the board plane, lags `place` while moving
    pub position: Vec2,
    moving: bool,
    /// Baseline for the next animation step, `None` until the first tick
    last_anim_time: Option<f64>,
}

impl Tile {
    /// Create a tile resting at `place`
    pub fn new(value: u32, place: usize, layout: &BoardLayout) -> Self {
        let mut tile = Self {
            value,
            place,
            position: Vec2::ZERO,
            moving: false,
            last_anim_time: None,
        };
        tile.set_to_place(place, layout);
        tile
    }

    #[inline]
    pub fn id(&self) -> TileId {
        TileId(self.value)
    }

    /// Whether this is the empty slot
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value == 0
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Snap to a slot with no animation
    pub fn set_to_place(&mut self, place: usize, layout: &BoardLayout) {
        self.place = place;
        self.position = layout.target(place);
        self.moving = false;
        self.last_anim_time = None;
    }

    /// Start sliding toward a new slot. The empty slot has nothing to draw,
    /// so it only changes place.
    pub fn move_to(&mut self, place: usize) {
        if !self.is_empty() {
            self.moving = true;
        }
        self.place = place;
    }

    /// Advance the slide animation to `time` (ms)
    ///
    /// The first tick after a move only records a baseline so a long idle gap
    /// never turns into a jump. Each later tick covers the fraction
    /// `elapsed / duration_ms` (clamped to 1) of the remaining distance.
    pub fn animate(&mut self, time: f64, layout: &BoardLayout, duration_ms: f64) {
        if !self.moving {
            return;
        }
        let Some(last) = self.last_anim_time else {
            self.last_anim_time = Some(time);
            return;
        };

        let target = layout.target(self.place);
        let delta = target - self.position;
        let factor = ((time - last) / duration_ms).clamp(0.0, 1.0) as f32;
        self.last_anim_time = Some(time);
        self.position += delta * factor;

        let remaining = (target - self.position).abs();
        if remaining.x < SETTLE_EPSILON && remaining.y < SETTLE_EPSILON {
            self.moving = false;
            self.last_anim_time = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ANIMATION_DURATION_MS;

    fn layout() -> BoardLayout {
        BoardLayout::new(4)
    }

    #[test]
    fn test_new_tile_rests_on_slot() {
        let layout = layout();
        let tile = Tile::new(7, 5, &layout);
        assert_eq!(tile.position, layout.target(5));
        assert!(!tile.is_moving());
        assert_eq!(tile.id(), TileId(7));
    }

    #[test]
    fn test_empty_tile_never_moves() {
        let layout = layout();
        let mut tile = Tile::new(0, 15, &layout);
        tile.move_to(11);
        assert_eq!(tile.place, 11);
        assert!(!tile.is_moving());
        tile.animate(16.0, &layout, ANIMATION_DURATION_MS);
        assert_eq!(tile.position, layout.target(15));
    }

    #[test]
    fn test_animate_settled_tile_is_noop() {
        let layout = layout();
        let mut tile = Tile::new(3, 2, &layout);
        let before = tile.position;
        tile.animate(100.0, &layout, ANIMATION_DURATION_MS);
        tile.animate(200.0, &layout, ANIMATION_DURATION_MS);
        assert!(!tile.is_moving());
        assert_eq!(tile.position, before);
    }

    #[test]
    fn test_first_tick_is_baseline_only() {
        let layout = layout();
        let mut tile = Tile::new(3, 2, &layout);
        tile.move_to(3);
        tile.animate(5000.0, &layout, ANIMATION_DURATION_MS);
        assert!(tile.is_moving());
        assert_eq!(tile.position, layout.target(2));
    }

    #[test]
    fn test_partial_step_moves_fraction_of_remaining() {
        let layout = layout();
        let mut tile = Tile::new(3, 2, &layout);
        let start = tile.position;
        let end = layout.target(3);
        tile.move_to(3);
        tile.animate(0.0, &layout, ANIMATION_DURATION_MS);
        tile.animate(25.0, &layout, ANIMATION_DURATION_MS);

        let expected = start + (end - start) * 0.25;
        assert!((tile.position - expected).length() < 1e-5);
        assert!(tile.is_moving());
    }

    #[test]
    fn test_long_frame_completes_move() {
        let layout = layout();
        let mut tile = Tile::new(3, 2, &layout);
        tile.move_to(6);
        tile.animate(0.0, &layout, ANIMATION_DURATION_MS);
        tile.animate(500.0, &layout, ANIMATION_DURATION_MS);
        assert!(!tile.is_moving());
        assert!((tile.position - layout.target(6)).length() < 1e-4);

        // Baseline was reset: the next move starts with a baseline tick again
        tile.move_to(2);
        tile.animate(10_000.0, &layout, ANIMATION_DURATION_MS);
        assert!((tile.position - layout.target(6)).length() < 1e-4);
    }

    #[test]
    fn test_converges_at_60hz() {
        let layout = layout();
        let mut tile = Tile::new(9, 0, &layout);
        tile.move_to(1);
        let mut time = 0.0;
        let mut frames = 0;
        while tile.is_moving() {
            tile.animate(time, &layout, ANIMATION_DURATION_MS);
            time += 16.0;
            frames += 1;
            assert!(frames < 500, "tile never settled");
        }
        let err = (tile.position - layout.target(1)).abs();
        assert!(err.x < SETTLE_EPSILON && err.y < SETTLE_EPSILON);
    }
}
