//! Board geometry
//!
//! The board lies on the XZ plane, centred on the origin. Place `p` sits at
//! row `p / width` and column `p % width`; columns grow along +X and rows
//! along +Z. Positions are stored as `Vec2(x, z)`.

use glam::{Vec2, Vec3};

use crate::consts::{TILE_EXTENT, TILE_GUTTER, TILE_HEIGHT};

/// Slot arithmetic and world placement for a square board
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub width: usize,
    /// Tile footprint
    pub tile_extent: f32,
    /// Gap between tiles
    pub gutter: f32,
}

impl BoardLayout {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            tile_extent: TILE_EXTENT,
            gutter: TILE_GUTTER,
        }
    }

    /// Number of slots on the board
    #[inline]
    pub fn size(&self) -> usize {
        self.width * self.width
    }

    #[inline]
    pub fn row(&self, place: usize) -> usize {
        place / self.width
    }

    #[inline]
    pub fn column(&self, place: usize) -> usize {
        place % self.width
    }

    /// Distance between neighbouring tile centres
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.tile_extent + self.gutter
    }

    /// Centre of the slot at `place`
    pub fn target(&self, place: usize) -> Vec2 {
        let half_span = (self.width.saturating_sub(1)) as f32 * self.pitch() / 2.0;
        Vec2::new(
            -half_span + self.column(place) as f32 * self.pitch(),
            -half_span + self.row(place) as f32 * self.pitch(),
        )
    }

    /// Lift a board-plane position into world space (tile centre)
    #[inline]
    pub fn to_world(&self, position: Vec2) -> Vec3 {
        Vec3::new(position.x, 0.0, position.y)
    }

    /// Half extents of a tile box
    #[inline]
    pub fn tile_half_extents(&self) -> Vec3 {
        Vec3::new(self.tile_extent / 2.0, TILE_HEIGHT / 2.0, self.tile_extent / 2.0)
    }

    /// Orthogonal neighbours of `place`, no wrap-around between rows
    pub fn neighbors(&self, place: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(4);
        let w = self.width;
        if self.column(place) != 0 {
            out.push(place - 1);
        }
        if self.column(place) != w - 1 {
            out.push(place + 1);
        }
        if self.row(place) != 0 {
            out.push(place - w);
        }
        if self.row(place) != w - 1 {
            out.push(place + w);
        }
        out
    }

    /// Whether two places share an edge
    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).contains(&b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_centred() {
        let layout = BoardLayout::new(4);
        // Matches the classic layout: corners at ±1.65 with a 1.1 pitch
        let first = layout.target(0);
        let last = layout.target(15);
        assert!((first.x + 1.65).abs() < 1e-5);
        assert!((first.y + 1.65).abs() < 1e-5);
        assert!((last.x - 1.65).abs() < 1e-5);
        assert!((last.y - 1.65).abs() < 1e-5);
        assert!((first + last).length() < 1e-5);
    }

    #[test]
    fn test_target_row_and_column() {
        let layout = BoardLayout::new(4);
        let p = layout.target(6); // row 1, column 2
        assert!((p.x - 0.55).abs() < 1e-5);
        assert!((p.y + 0.55).abs() < 1e-5);
    }

    #[test]
    fn test_neighbors_no_wrap() {
        let layout = BoardLayout::new(4);
        let mut n = layout.neighbors(3);
        n.sort();
        assert_eq!(n, vec![2, 7]);

        let mut n = layout.neighbors(4);
        n.sort();
        assert_eq!(n, vec![0, 5, 8]);

        let mut n = layout.neighbors(5);
        n.sort();
        assert_eq!(n, vec![1, 4, 6, 9]);

        assert!(!layout.adjacent(3, 4));
        assert!(layout.adjacent(11, 15));
    }
}
