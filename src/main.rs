//! Fifteen entry point
//!
//! Handles platform-specific initialization and starts the render loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use fifteen::app::{self, Controller};
    use fifteen::persistence;
    use fifteen::pick::{BoxCaster, Camera};
    use fifteen::platform::web::RafHost;
    use fifteen::renderer::CanvasSurface;
    use fifteen::{FrameScheduler, PuzzleField, Settings};

    type Game = Controller<CanvasSurface, BoxCaster>;

    fn fresh_field(settings: &Settings) -> PuzzleField {
        let seed = settings.seed_or(js_sys::Date::now() as u64);
        log::info!("New board with seed: {}", seed);
        PuzzleField::new(settings.width, seed)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Fifteen starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let mut settings = Settings::load();
        for problem in settings.sanitize() {
            log::error!("Settings: {}", problem);
        }

        let (field, moves) = match persistence::load() {
            Some((field, moves)) if settings.resume_saved && !field.is_completed() => {
                log::info!("Resuming saved board ({} moves)", moves);
                (field, moves)
            }
            _ => (fresh_field(&settings), 0),
        };

        let scheduler = FrameScheduler::new(Rc::new(RafHost::new(window.clone())));
        let surface = CanvasSurface::new(ctx, Camera::top_down(1.0), canvas.width(), canvas.height());
        let mut game = Controller::new(scheduler, field, surface, BoxCaster::new(Camera::top_down(1.0)))
            .with_moves(moves);
        game.apply_settings(&settings);
        let game = Rc::new(RefCell::new(game));

        fit_canvas(&window, &canvas, &game);
        setup_input_handlers(&window, &canvas, game.clone(), settings);

        wasm_bindgen_futures::spawn_local(app::run(game));

        log::info!("Fifteen running!");
    }

    /// Match the canvas backing store to its CSS size
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement, game: &Rc<RefCell<Game>>) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        game.borrow_mut().resize(width, height);
    }

    /// Pointer position in backing-store pixels
    fn canvas_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f32, f32) {
        let rect = canvas.get_bounding_client_rect();
        let sx = canvas.width() as f64 / rect.width().max(1.0);
        let sy = canvas.height() as f64 / rect.height().max(1.0);
        (
            ((event.client_x() as f64 - rect.left()) * sx) as f32,
            ((event.client_y() as f64 - rect.top()) * sy) as f32,
        )
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
        settings: Settings,
    ) {
        // Hover
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = canvas_point(&canvas_clone, &event);
                game.borrow_mut().pointer_move(x, y);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click to slide
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = canvas_point(&canvas_clone, &event);
                let mut g = game.borrow_mut();
                if g.pointer_down(x, y).is_some() {
                    if g.field().is_completed() {
                        persistence::clear();
                    } else {
                        persistence::save(g.field(), g.moves());
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window resize
        {
            let game = game.clone();
            let window_clone = window.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                fit_canvas(&window_clone, &canvas_clone, &game);
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: N shuffles a new board, H toggles hover highlight
        {
            let mut settings = settings;
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    "n" | "N" => {
                        persistence::clear();
                        game.borrow_mut().replace_field(fresh_field(&settings), 0);
                    }
                    "h" | "H" => {
                        settings.hover_highlight = !settings.hover_highlight;
                        game.borrow_mut().apply_settings(&settings);
                        settings.save();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fifteen (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let settings = native::settings_from_args(std::env::args().nth(1));
    native::run_demo(&settings);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;

    use fifteen::app::{self, Controller, LoopState};
    use fifteen::pick::{BoxCaster, Camera};
    use fifteen::platform::ManualHost;
    use fifteen::renderer::AsciiSurface;
    use fifteen::settings::BoardPreset;
    use fifteen::{FrameScheduler, PuzzleField, Settings};

    const VIEWPORT: (u32, u32) = (800, 800);
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const DEMO_MOVES: usize = 6;

    /// Settings from a preset name, a JSON file path, or defaults
    pub fn settings_from_args(arg: Option<String>) -> Settings {
        let Some(arg) = arg else {
            return Settings::default();
        };
        if let Some(preset) = BoardPreset::from_str(&arg) {
            log::info!("Using {} preset", preset.as_str());
            return Settings::from_preset(preset);
        }
        match std::fs::read_to_string(&arg) {
            Ok(json) => Settings::from_json(&json).unwrap_or_else(|err| {
                log::error!("Bad settings file {}: {}", arg, err);
                Settings::default()
            }),
            Err(err) => {
                log::error!("Cannot read {}: {}", arg, err);
                Settings::default()
            }
        }
    }

    /// Slide a few tiles through the full input → frame → render path
    pub fn run_demo(settings: &Settings) {
        let mut settings = settings.clone();
        for problem in settings.sanitize() {
            log::error!("Settings: {}", problem);
        }

        let entropy = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let seed = settings.seed_or(entropy);
        log::info!("Board seed: {}", seed);

        let host = ManualHost::new();
        let scheduler = FrameScheduler::new(host.clone());
        let field = PuzzleField::new(settings.width, seed);
        let camera = Camera::top_down(1.0);
        let mut controller = Controller::new(
            scheduler,
            field,
            AsciiSurface::default(),
            BoxCaster::new(camera.clone()),
        );
        controller.apply_settings(&settings);
        controller.resize(VIEWPORT.0, VIEWPORT.1);
        let game = Rc::new(RefCell::new(controller));

        let mut pool = LocalPool::new();
        if let Err(err) = pool.spawner().spawn_local(app::run(game.clone())) {
            log::error!("Could not start render loop: {}", err);
            return;
        }

        let mut time = 0.0;
        let mut pump = |pool: &mut LocalPool| {
            pool.run_until_stalled();
            while game.borrow().state() != LoopState::Idle {
                time += FRAME_MS;
                host.fire(time);
                pool.run_until_stalled();
            }
        };
        pump(&mut pool);
        println!("Shuffled:\n{}", game.borrow().surface().last_frame);

        let mut previous = None;
        for _ in 0..DEMO_MOVES {
            let (x, y) = {
                let g = game.borrow();
                let field = g.field();
                let layout = field.layout();
                // Avoid undoing the previous slide when there is a choice
                let neighbors = layout.neighbors(field.empty_place());
                let place = neighbors
                    .iter()
                    .copied()
                    .find(|&p| Some(p) != previous)
                    .unwrap_or(neighbors[0]);
                let ndc = camera.world_to_ndc(layout.to_world(layout.target(place)));
                (
                    (ndc.x + 1.0) / 2.0 * VIEWPORT.0 as f32,
                    (1.0 - ndc.y) / 2.0 * VIEWPORT.1 as f32,
                )
            };

            let moved = game.borrow_mut().pointer_down(x, y);
            if let Some(mv) = moved {
                previous = Some(mv.to);
                pump(&mut pool);
                println!("Slid {}:\n{}", mv.tile.0, game.borrow().surface().last_frame);
            }
        }

        let g = game.borrow();
        println!(
            "{} moves, {} frames rendered, solved: {}",
            g.moves(),
            g.surface().frames_rendered,
            g.field().is_completed()
        );
        drop(g);

        game.borrow_mut().shutdown();
        pool.run();
    }
}
