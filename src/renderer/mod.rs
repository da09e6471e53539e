//! Render surfaces
//!
//! The 3D look is the host's business; these surfaces draw the board from
//! the same `FrameView` the controller hands any renderer.

pub mod ascii;
#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use ascii::AsciiSurface;
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
