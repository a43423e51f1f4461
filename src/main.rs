//! Cake Flappy entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent, Window};

    use cake_flappy::audio::AudioManager;
    use cake_flappy::input::{self, InputAction, Intent};
    use cake_flappy::renderer::{CanvasRenderer, FrameStyle, PriceChart, build_frame};
    use cake_flappy::scheduler::{FrameHost, FrameScheduler};
    use cake_flappy::settings::Settings;
    use cake_flappy::sim::{IngredientCatalog, LogoCatalog, Simulation, autopilot};

    /// `requestAnimationFrame` as a frame host
    struct RafHost {
        window: Window,
        /// Installed once the game exists, since the callback owns a handle to it
        callback: Option<Closure<dyn FnMut(f64)>>,
    }

    impl FrameHost for RafHost {
        type Handle = i32;

        fn request_frame(&mut self) -> Option<i32> {
            let callback = self.callback.as_ref()?;
            self.window
                .request_animation_frame(callback.as_ref().unchecked_ref())
                .ok()
        }

        fn cancel_frame(&mut self, handle: i32) {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }

    /// PCG stream for the backdrop chart, separate from the simulation's
    const CHART_STREAM: u64 = 0xc4a7;

    /// Game instance holding all state
    struct Game {
        sim: Simulation,
        scheduler: FrameScheduler<RafHost>,
        renderer: Option<CanvasRenderer>,
        chart: PriceChart,
        audio: AudioManager,
        settings: Settings,
        autopilot: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// One display refresh: pilot, advance, draw, play sounds
        fn frame(&mut self, now: f64) {
            if self.autopilot {
                if !self.sim.is_active() {
                    self.sim.apply_intent(Intent::Start);
                } else if autopilot::wants_jump(self.sim.state(), self.sim.tuning()) {
                    self.sim.apply_jump();
                }
            }
            self.track_fps(now);

            let Self {
                sim,
                scheduler,
                renderer,
                chart,
                audio,
                settings,
                autopilot,
                fps,
                ..
            } = self;
            let style = FrameStyle {
                time: now / 1000.0,
                chart: chart.points(),
                bowl_shake: settings.effective_bowl_shake(),
                fps: settings.show_fps.then_some(*fps),
                autopilot: *autopilot,
            };
            let stepped = scheduler.on_frame(now, sim, |snap| {
                if let Some(renderer) = renderer.as_mut() {
                    renderer.draw(&build_frame(&snap, &style));
                }
            });
            if let Some(dt) = stepped {
                chart.update(dt);
            }
            for event in sim.drain_events() {
                audio.play_event(&event);
            }
        }

        fn handle_input(&mut self, action: InputAction) {
            // Browsers only allow audio after a user gesture
            self.audio.resume();
            let intent = input::resolve(action, self.sim.is_active(), self.sim.state());
            self.sim.apply_intent(intent);
            if intent == Intent::Restart {
                self.chart.reset(self.sim.state().height);
            }
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.audio.apply_settings(&self.settings);
            log::info!("Muted: {}", muted);
        }

        /// Match the backing store to the element size. A run in progress
        /// keeps its playfield until the next restart.
        fn resize(&mut self, canvas: &HtmlCanvasElement, dpr: f64) {
            let client_w = canvas.client_width();
            let client_h = canvas.client_height();
            canvas.set_width((client_w as f64 * dpr) as u32);
            canvas.set_height((client_h as f64 * dpr) as u32);
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.set_scale(dpr);
            }
            self.sim.resize(client_w as f32, client_h as f32);
            if !self.sim.is_active() {
                self.chart.reset(self.sim.state().height);
            }
        }
    }

    fn load_settings(document: &web_sys::Document) -> Settings {
        document
            .get_element_by_id("game-settings")
            .and_then(|el| el.text_content())
            .map(|json| Settings::from_json_or_default(&json))
            .unwrap_or_default()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Cake Flappy starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No <canvas id=\"canvas\"> element");
            return;
        };

        let settings = load_settings(&document);
        let dpr = window.device_pixel_ratio();
        let seed = js_sys::Date::now() as u64;

        let renderer = CanvasRenderer::new(&canvas, "assets", dpr);
        if renderer.is_none() {
            log::error!("Canvas 2D context unavailable");
        }

        let game = Rc::new(RefCell::new(Game {
            sim: Simulation::new(
                settings.tuning.clone(),
                IngredientCatalog::default(),
                LogoCatalog::default(),
                Pcg32::seed_from_u64(seed),
            ),
            scheduler: FrameScheduler::new(
                RafHost {
                    window: window.clone(),
                    callback: None,
                },
                settings.tuning.max_frame_dt,
            ),
            renderer,
            chart: PriceChart::new(0.0, Pcg32::new(seed, CHART_STREAM)),
            audio: AudioManager::new(&settings),
            settings,
            autopilot: false,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));
        game.borrow_mut().resize(&canvas, dpr);

        log::info!("Game initialized with seed: {}", seed);

        {
            let g = game.clone();
            let callback = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
                g.borrow_mut().frame(now);
            });
            game.borrow_mut().scheduler.host_mut().callback = Some(callback);
        }

        setup_input_handlers(&window, &canvas, game.clone());

        let mut g = game.borrow_mut();
        let surface_ready = g.renderer.is_some();
        if let Err(err) = g.scheduler.start(surface_ready) {
            log::error!("Game loop not started: {}", err);
            return;
        }

        log::info!("Cake Flappy running!");
    }

    fn setup_input_handlers(window: &Window, canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " => {
                        event.prevent_default();
                        g.handle_input(InputAction::Jump);
                    }
                    "i" | "I" => {
                        g.autopilot = !g.autopilot;
                        log::info!("Autopilot: {}", g.autopilot);
                    }
                    "m" | "M" => g.toggle_mute(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer (mouse, touch and pen)
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let x = event.client_x() as f32 - rect.left() as f32;
                let y = event.client_y() as f32 - rect.top() as f32;
                game.borrow_mut().handle_input(InputAction::Pointer { x, y });
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Viewport changes
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
                game.borrow_mut().resize(&canvas_clone, dpr);
                log::info!("Canvas resized");
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cake Flappy (native) starting...");
    log::info!("Native mode runs a headless autopilot session - serve the wasm build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    headless_session(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one session with the autopilot at a fixed 60 Hz step and report the outcome
#[cfg(not(target_arch = "wasm32"))]
fn headless_session(seed: u64) {
    use cake_flappy::audio::SoundEffect;
    use cake_flappy::sim::{CelebrationStage, GameEvent, Simulation, autopilot};

    const DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    let mut sim = Simulation::seeded(seed);
    sim.init(400.0, 600.0);
    sim.start();
    log::info!("Headless session with seed {}", seed);

    for frame in 0..MAX_FRAMES {
        if autopilot::wants_jump(sim.state(), sim.tuning()) {
            sim.apply_jump();
        }
        sim.advance(DT);

        for event in sim.drain_events() {
            if let GameEvent::ObstaclePassed { score } = event {
                log::debug!("Score {}", score);
            }
            if let Some(effect) = SoundEffect::for_event(&event) {
                log::debug!("[{}] {:?}", effect.name(), event);
            }
        }

        let seconds = (frame + 1) as f32 * DT;
        if sim.state().is_game_over {
            log::info!(
                "Crashed after {:.1}s with score {} ({} of {} ingredients)",
                seconds,
                sim.state().score,
                sim.collected_ingredients().len(),
                sim.catalog().len()
            );
            return;
        }
        if sim.celebration().stage == CelebrationStage::Cake {
            log::info!(
                "Cake baked after {:.1}s with score {}",
                seconds,
                sim.state().score
            );
            return;
        }
    }
    log::info!("Stopped after {} frames without an outcome", MAX_FRAMES);
}
