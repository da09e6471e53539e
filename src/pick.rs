//! Screen-space picking
//!
//! The board asks a [`RayCaster`] which tile lies under a point given in
//! normalized device coordinates. [`BoxCaster`] is the stock implementation:
//! it unprojects the point through a perspective [`Camera`] and slab-tests
//! each tile's box.

use glam::{Mat4, Vec2, Vec3};

use crate::puzzle::TileId;

/// A pickable tile box in world space
#[derive(Debug, Clone, Copy)]
pub struct PickTarget {
    pub tile: TileId,
    pub center: Vec3,
    pub half_extents: Vec3,
}

/// Maps a screen point to the nearest tile it hits
pub trait RayCaster {
    fn cast_ray(&self, screen: Vec2, targets: &[PickTarget]) -> Option<TileId>;

    /// Viewport changed size (pixels)
    fn set_viewport(&mut self, _width: u32, _height: u32) {}
}

/// A world-space ray
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub dir: Vec3,
}

impl Ray {
    /// Distance along the ray to an axis-aligned box, `None` on a miss
    pub fn hit_box(&self, center: Vec3, half_extents: Vec3) -> Option<f32> {
        let min = center - half_extents;
        let max = center + half_extents;
        let inv = self.dir.recip();

        let t1 = (min - self.origin) * inv;
        let t2 = (max - self.origin) * inv;
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();

        if t_far < t_near.max(0.0) {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// Perspective camera looking at the board
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Five units above the board looking straight down, row 0 at the top
    pub fn top_down(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 5.0, 0.0),
            target: Vec3::ZERO,
            up: Vec3::NEG_Z,
            fov_y: 75.0_f32.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Update aspect ratio after a viewport resize
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        proj * view
    }

    /// World point to normalized device coordinates
    pub fn world_to_ndc(&self, point: Vec3) -> Vec2 {
        self.view_proj().project_point3(point).truncate()
    }

    /// Ray from the eye through a point in normalized device coordinates
    pub fn screen_ray(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        // perspective_rh maps depth to [0, 1]
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            dir: (far - near).normalize_or_zero(),
        }
    }
}

/// Ray caster testing tile boxes against a camera ray
#[derive(Debug, Clone)]
pub struct BoxCaster {
    pub camera: Camera,
}

impl BoxCaster {
    pub fn new(camera: Camera) -> Self {
        Self { camera }
    }
}

impl RayCaster for BoxCaster {
    fn cast_ray(&self, screen: Vec2, targets: &[PickTarget]) -> Option<TileId> {
        let ray = self.camera.screen_ray(screen);
        targets
            .iter()
            .filter_map(|t| ray.hit_box(t.center, t.half_extents).map(|d| (d, t.tile)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, tile)| tile)
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{BoardSnapshot, PuzzleField};

    fn solved_field() -> PuzzleField {
        let mut values: Vec<u32> = (1..16).collect();
        values.push(0);
        PuzzleField::from_snapshot(&BoardSnapshot { width: 4, values }).unwrap()
    }

    #[test]
    fn test_ray_hits_box_below() {
        let ray = Ray {
            origin: Vec3::new(0.0, 5.0, 0.0),
            dir: Vec3::NEG_Y,
        };
        let d = ray.hit_box(Vec3::ZERO, Vec3::new(0.5, 0.05, 0.5)).unwrap();
        assert!((d - 4.95).abs() < 1e-4);

        assert!(ray.hit_box(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(0.5)).is_none());
    }

    #[test]
    fn test_ray_behind_origin_misses() {
        let ray = Ray {
            origin: Vec3::new(0.0, 5.0, 0.0),
            dir: Vec3::Y,
        };
        assert!(ray.hit_box(Vec3::ZERO, Vec3::splat(0.5)).is_none());
    }

    #[test]
    fn test_screen_centre_points_down() {
        let camera = Camera::top_down(1.0);
        let ray = camera.screen_ray(Vec2::ZERO);
        assert!((ray.dir - Vec3::NEG_Y).length() < 1e-4);
    }

    #[test]
    fn test_top_of_screen_is_first_row() {
        let camera = Camera::top_down(1.0);
        let ndc = camera.world_to_ndc(Vec3::new(0.0, 0.0, -1.0));
        assert!(ndc.y > 0.0);
    }

    #[test]
    fn test_pick_tile_under_projected_centre() {
        let field = solved_field();
        let caster = BoxCaster::new(Camera::top_down(16.0 / 9.0));
        for place in [0, 5, 10, 14] {
            let tile = field.tile_at(place).unwrap();
            let world = field.layout().to_world(tile.position);
            let ndc = caster.camera.world_to_ndc(world);
            assert_eq!(field.picked_tile(ndc, &caster), Some(tile.id()));
        }
    }

    #[test]
    fn test_pick_gutter_and_empty_slot_miss() {
        let field = solved_field();
        let caster = BoxCaster::new(Camera::top_down(1.0));
        // Board centre falls in the gutter between the middle four tiles
        assert_eq!(field.picked_tile(Vec2::ZERO, &caster), None);

        let empty = field.layout().to_world(field.layout().target(15));
        let ndc = caster.camera.world_to_ndc(empty);
        assert_eq!(field.picked_tile(ndc, &caster), None);
    }

    #[test]
    fn test_nearest_target_wins() {
        let caster = BoxCaster::new(Camera::top_down(1.0));
        let half = Vec3::new(0.5, 0.05, 0.5);
        let targets = [
            PickTarget {
                tile: TileId(1),
                center: Vec3::ZERO,
                half_extents: half,
            },
            PickTarget {
                tile: TileId(2),
                center: Vec3::new(0.0, 1.0, 0.0),
                half_extents: half,
            },
        ];
        assert_eq!(caster.cast_ray(Vec2::ZERO, &targets), Some(TileId(2)));
    }
}
