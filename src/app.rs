//! Input, puzzle and render loop orchestration
//!
//! The controller only asks for frames when something changed: input,
//! resize, or a tile still sliding. Once the last tile settles the loop goes
//! idle until the next event.
//!
//! ```text
//! Idle --input/resize--> AwaitingFrame --frame--> Animating --frame--> ... --settled--> Idle
//!                                        \--frame, nothing moving--> Idle
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use futures::StreamExt;
use glam::Vec2;

use crate::pick::RayCaster;
use crate::pixels_to_ndc;
use crate::puzzle::{Move, PuzzleField, TileId};
use crate::scheduler::FrameScheduler;
use crate::settings::Settings;

/// Everything a surface needs to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub field: &'a PuzzleField,
    pub hovered: Option<TileId>,
    pub moves: u32,
    /// Frame timestamp (ms)
    pub time: f64,
}

/// The rendering collaborator
pub trait RenderSurface {
    fn render_frame(&mut self, view: &FrameView<'_>);
    fn resize(&mut self, width: u32, height: u32);
}

/// Render loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing requested, nothing moving
    Idle,
    /// A frame was requested and has not arrived yet
    AwaitingFrame,
    /// Tiles are sliding; the next frame is already requested
    Animating,
}

/// Owns the board and the scheduler and turns input into moves
pub struct Controller<S, C> {
    scheduler: FrameScheduler,
    field: PuzzleField,
    surface: S,
    caster: C,
    viewport: (f32, f32),
    hovered: Option<TileId>,
    hover_highlight: bool,
    state: LoopState,
    moves: u32,
    solved_reported: bool,
}

impl<S: RenderSurface, C: RayCaster> Controller<S, C> {
    pub fn new(scheduler: FrameScheduler, field: PuzzleField, surface: S, caster: C) -> Self {
        let solved = field.is_completed();
        Self {
            scheduler,
            field,
            surface,
            caster,
            viewport: (0.0, 0.0),
            hovered: None,
            hover_highlight: true,
            state: LoopState::Idle,
            moves: 0,
            solved_reported: solved,
        }
    }

    /// Continue counting from an earlier session
    pub fn with_moves(mut self, moves: u32) -> Self {
        self.moves = moves;
        self
    }

    /// Apply user preferences to the running game
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.hover_highlight = settings.hover_highlight;
        if !self.hover_highlight {
            self.hovered = None;
        }
        if let Err(err) = self.field.set_animation_duration(settings.animation_ms) {
            log::error!("Keeping previous animation speed: {}", err);
        }
        self.request_render();
    }

    pub fn field(&self) -> &PuzzleField {
        &self.field
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn hovered(&self) -> Option<TileId> {
        self.hovered
    }

    /// Start over on another board
    pub fn replace_field(&mut self, field: PuzzleField, moves: u32) {
        self.solved_reported = field.is_completed();
        self.field = field;
        self.moves = moves;
        self.hovered = None;
        self.request_render();
    }

    /// Ask for one redraw
    pub fn request_render(&mut self) {
        self.scheduler.request_frame();
        if self.state == LoopState::Idle && self.scheduler.is_pending() {
            self.state = LoopState::AwaitingFrame;
        }
    }

    fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        pixels_to_ndc(x, y, self.viewport)
    }

    /// Pointer moved to pixel `(x, y)`
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.hover_highlight {
            let ndc = self.to_ndc(x, y);
            self.hovered = self.field.picked_tile(ndc, &self.caster);
        }
        self.request_render();
    }

    /// Pointer pressed at pixel `(x, y)`: try to slide the tile under it
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<Move> {
        let ndc = self.to_ndc(x, y);
        let applied = match self.field.picked_tile(ndc, &self.caster) {
            Some(tile) if !self.field.is_completed() => self.field.try_move(tile).ok(),
            _ => None,
        };
        if let Some(mv) = applied {
            self.moves += 1;
            log::debug!("Moved tile {} from {} to {}", mv.tile.0, mv.from, mv.to);
        }
        self.request_render();
        applied
    }

    /// Viewport resized to `width` x `height` pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width as f32, height as f32);
        self.caster.set_viewport(width, height);
        self.surface.resize(width, height);
        self.request_render();
    }

    /// Handle one delivered frame
    pub fn tick(&mut self, time: f64) {
        if self.field.is_interactive() {
            self.field.animate(time);
        }

        let animating = self.field.is_interactive();
        if animating {
            self.scheduler.request_frame();
        }

        self.surface.render_frame(&FrameView {
            field: &self.field,
            hovered: self.hovered,
            moves: self.moves,
            time,
        });

        self.state = if animating {
            LoopState::Animating
        } else if self.scheduler.is_pending() {
            LoopState::AwaitingFrame
        } else {
            LoopState::Idle
        };

        if !animating && !self.solved_reported && self.field.is_completed() {
            self.solved_reported = true;
            log::info!("Puzzle solved in {} moves", self.moves);
        }
    }

    /// Stop rendering for good
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
        self.state = LoopState::Idle;
    }
}

/// Drive the controller from on-demand frames until the scheduler shuts down
pub async fn run<S: RenderSurface, C: RayCaster>(app: Rc<RefCell<Controller<S, C>>>) {
    let mut frames = app.borrow().scheduler().on_demand();
    while let Some(time) = frames.next().await {
        app.borrow_mut().tick(time);
    }
    log::info!("Render loop stopped");
}
