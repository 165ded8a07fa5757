//! Hole City entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use hole_city::consts::*;
    use hole_city::render::{RenderSnapshot, SceneSetup};
    use hole_city::sim::{GameEvent, GameState, MoveInput, TickInput, level_by_number, tick};
    use hole_city::{GameConfig, ScoreBoard};

    // Hand-off to the three.js renderer loaded by index.html
    #[wasm_bindgen(inline_js = "
        export function draw_frame(instances, models, overlay, camera, ground, hole) {
            const r = window.holeCityRenderer;
            if (r && r.draw) {
                r.draw({ instances, models: models.split('|'), overlay, camera, ground, hole });
            }
        }

        export function load_scene(json) {
            const r = window.holeCityRenderer;
            if (r && r.setScene) {
                r.setScene(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn draw_frame(
            instances: &[f32],
            models: &str,
            overlay: &[f32],
            camera: &[f32],
            ground: &[f32],
            hole: &[f32],
        );
        fn load_scene(json: &str);
    }

    /// Ring segments for the hole overlay
    const RING_SEGMENTS: u32 = 64;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        config: GameConfig,
        scores: ScoreBoard,
        accumulator: f32,
        last_time: f64,
        held_keys: BTreeSet<String>,
        pause_requested: bool,
    }

    impl Game {
        fn new(config: GameConfig, scores: ScoreBoard) -> Self {
            let level = level_by_number(1).unwrap_or_else(hole_city::sim::levels::starter_city);
            Self {
                state: GameState::new(level, config.clone()),
                config,
                scores,
                accumulator: 0.0,
                last_time: 0.0,
                held_keys: BTreeSet::new(),
                pause_requested: false,
            }
        }

        fn tick_input(&self) -> TickInput {
            TickInput {
                movement: MoveInput::from_keys(self.held_keys.iter().map(String::as_str)),
                pause: self.pause_requested,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let level_id = self.state.level.id.clone();
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.tick_input();
                let scores = &mut self.scores;
                tick(&mut self.state, &input, SIM_DT, &mut |event| match event {
                    GameEvent::Eaten { score_delta, .. } => {
                        scores.record(&level_id, score_delta);
                    }
                    GameEvent::Grew { grow_level, radius } => {
                        log::info!("Grow level {grow_level}, radius {radius:.2}");
                    }
                    GameEvent::Armed { .. } => {}
                });
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.pause_requested = false;
            }

            if self.state.is_cleared() {
                self.next_level();
            }
        }

        fn next_level(&mut self) {
            self.scores.save();
            let next = self.state.level.number + 1;
            let level = level_by_number(next)
                .or_else(|| level_by_number(1))
                .unwrap_or_else(hole_city::sim::levels::starter_city);
            log::info!("Level cleared, loading '{}'", level.name);
            self.load_level(level);
        }

        fn load_level(&mut self, level: hole_city::sim::LevelDescriptor) {
            self.state = GameState::new(level, self.config.clone());
            self.send_scene();
            self.scores.reset_total();
            self.accumulator = 0.0;
            self.held_keys.clear();
        }

        /// Theme and ground tiles, once per level
        fn send_scene(&self) {
            match SceneSetup::for_state(&self.state).to_json() {
                Ok(json) => load_scene(&json),
                Err(e) => log::warn!("Could not serialize scene: {e}"),
            }
        }

        /// Hand the current frame to the renderer
        fn render(&self) {
            let snap = RenderSnapshot::capture(&self.state);
            let overlay = snap.hole_overlay(RING_SEGMENTS);
            let camera = [
                snap.camera_position[0],
                snap.camera_position[1],
                snap.camera_position[2],
                snap.camera_target[0],
                snap.camera_target[1],
                snap.camera_target[2],
                snap.fov_degrees,
            ];
            let hole = [snap.hole_radius, snap.progress];
            draw_frame(
                snap.instance_floats(),
                &snap.models.join("|"),
                bytemuck::cast_slice(&overlay),
                &camera,
                &snap.ground_offset,
                &hole,
            );
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let set = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            set("#hud-score .hud-value", &self.scores.total().to_string());
            set("#hud-level .hud-value", &self.state.level.name);
            set(
                "#hud-grow .hud-value",
                &(self.state.growth.grow_level() + 1).to_string(),
            );
            let best = self.scores.best_for(&self.state.level.id).unwrap_or(0);
            set("#hud-best .hud-value", &best.to_string());

            if let Some(el) = document.get_element_by_id("pause-menu") {
                let class = if self.state.paused { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Hole City starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, cannot start");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let config = GameConfig::load();
        let scores = ScoreBoard::load();
        let game = Rc::new(RefCell::new(Game::new(config, scores)));
        game.borrow().send_scene();

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Hole City running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down: held movement keys plus one-shot commands
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                match key.as_str() {
                    "Escape" | "p" | "P" => g.pause_requested = true,
                    "n" | "N" => g.next_level(),
                    _ => {
                        g.held_keys.insert(key.to_ascii_lowercase());
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut()
                    .held_keys
                    .remove(&event.key().to_ascii_lowercase());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Window blur (click outside): drop held keys, pause if running
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut g = game.borrow_mut();
            g.held_keys.clear();
            if !g.state.paused {
                g.pause_requested = true;
                log::info!("Auto-paused (window blur)");
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hole City (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let level = std::env::args()
        .nth(1)
        .and_then(|arg| match arg.parse::<u32>() {
            Ok(n) => hole_city::sim::level_by_number(n),
            Err(_) => hole_city::sim::level_by_id(&arg),
        })
        .unwrap_or_else(hole_city::sim::levels::starter_city);

    headless::run(level, hole_city::GameConfig::load());
}

/// Scripted run: sweep the world in a widening square spiral
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use hole_city::ScoreBoard;
    use hole_city::consts::SIM_DT;
    use hole_city::render::{RenderSnapshot, SceneSetup};
    use hole_city::sim::{GameEvent, GameState, LevelDescriptor, MoveInput, TickInput, tick};

    const SECONDS: u32 = 120;
    const KEYS: [&str; 4] = ["d", "s", "a", "w"];

    pub fn run(level: LevelDescriptor, config: hole_city::GameConfig) {
        let mut state = GameState::new(level, config);
        let mut scores = ScoreBoard::load();
        let level_id = state.level.id.clone();
        let ticks_per_second = (1.0 / SIM_DT).round() as u32;

        let mut leg = 0usize;
        let mut leg_ticks = ticks_per_second / 2;
        let mut remaining_on_leg = leg_ticks;

        for _ in 0..SECONDS * ticks_per_second {
            let input = TickInput {
                movement: MoveInput::from_keys([KEYS[leg % KEYS.len()]]),
                pause: false,
            };
            tick(&mut state, &input, SIM_DT, &mut |event| {
                if let GameEvent::Eaten { score_delta, .. } = event {
                    scores.record(&level_id, score_delta);
                }
            });

            remaining_on_leg -= 1;
            if remaining_on_leg == 0 {
                leg += 1;
                // Lengthen every second leg to widen the spiral
                if leg % 2 == 0 {
                    leg_ticks += ticks_per_second / 4;
                }
                remaining_on_leg = leg_ticks;
            }
            if state.is_cleared() {
                break;
            }
        }
        scores.save();

        let snap = RenderSnapshot::capture(&state);
        let stats = state.consumption_stats();
        println!("\nLevel: {} ({})", state.level.name, state.level.id);
        println!(
            "Ticks: {}  Score: {}  Eaten: {}/{}",
            state.time_ticks,
            state.score,
            state.entities.len() - state.remaining(),
            state.entities.len()
        );
        println!(
            "Hole radius: {:.2}  Grow level: {}  Progress: {:.0}%",
            snap.hole_radius,
            snap.grow_level,
            snap.progress * 100.0
        );
        println!(
            "Rejections: too large {}, not armed {}, off center {}",
            stats.too_large, stats.not_armed, stats.off_center
        );
    }
}
