//! 2D canvas rendering through the picking camera
//!
//! Tile tops are projected with the same camera the ray caster uses, so
//! what is drawn under the pointer is what gets picked.

use glam::{Mat4, Vec3};
use web_sys::CanvasRenderingContext2d;

use crate::app::{FrameView, RenderSurface};
use crate::pick::Camera;

const BACKGROUND: &str = "#101010";
const TILE: &str = "#0000d0";
const TILE_HOVER: &str = "#2a2aff";
const LABEL: &str = "#aaaaaa";

/// Draws the board onto a 2D canvas context
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    camera: Camera,
    size: (f64, f64),
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, camera: Camera, width: u32, height: u32) -> Self {
        Self {
            ctx,
            camera,
            size: (width as f64, height as f64),
        }
    }

    fn to_pixels(&self, view_proj: &Mat4, point: Vec3) -> (f64, f64) {
        let ndc = view_proj.project_point3(point);
        let (w, h) = self.size;
        (
            (ndc.x as f64 + 1.0) / 2.0 * w,
            (1.0 - ndc.y as f64) / 2.0 * h,
        )
    }
}

impl RenderSurface for CanvasSurface {
    fn render_frame(&mut self, view: &FrameView<'_>) {
        let (w, h) = self.size;
        let ctx = &self.ctx;
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);

        let layout = view.field.layout();
        let half = layout.tile_half_extents();
        let view_proj = self.camera.view_proj();

        let (left, _) = self.to_pixels(&view_proj, Vec3::new(-half.x, half.y, 0.0));
        let (right, _) = self.to_pixels(&view_proj, Vec3::new(half.x, half.y, 0.0));
        ctx.set_font(&format!("bold {}px sans-serif", ((right - left) * 0.4).round()));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");

        for tile in view.field.tiles().iter().filter(|t| !t.is_empty()) {
            let top = layout.to_world(tile.position) + Vec3::new(0.0, half.y, 0.0);
            let corners = [
                Vec3::new(-half.x, 0.0, -half.z),
                Vec3::new(half.x, 0.0, -half.z),
                Vec3::new(half.x, 0.0, half.z),
                Vec3::new(-half.x, 0.0, half.z),
            ]
            .map(|c| self.to_pixels(&view_proj, top + c));

            let fill = if view.hovered == Some(tile.id()) {
                TILE_HOVER
            } else {
                TILE
            };
            ctx.set_fill_style_str(fill);
            ctx.begin_path();
            ctx.move_to(corners[0].0, corners[0].1);
            for &(x, y) in &corners[1..] {
                ctx.line_to(x, y);
            }
            ctx.close_path();
            ctx.fill();

            let (cx, cy) = self.to_pixels(&view_proj, top);
            ctx.set_fill_style_str(LABEL);
            let _ = ctx.fill_text(&tile.value.to_string(), cx, cy);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width as f64, height as f64);
        self.camera.set_viewport(width, height);
    }
}
