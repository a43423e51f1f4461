//! Simulation core
//!
//! [`Simulation`] owns the game state, the injected RNG and catalogs, and the
//! outgoing event queue. Hosts drive it with `advance(dt)` once per frame and
//! forward player intents; renderers read a [`Snapshot`].

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::celebration::{Celebration, CelebrationStage};
use super::state::{GameEvent, GameState, IngredientCatalog, IngredientId, LogoCatalog};
use super::tick::{TickEnv, tick};
use crate::input::Intent;
use crate::tuning::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// No viewport yet; every operation is a no-op
    Uninitialized,
    /// State constructed, physics not running (e.g. assets still loading)
    Ready,
    /// Physics running
    Active,
}

/// Read-only view handed to renderers each frame
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub state: &'a GameState,
    pub tuning: &'a Tuning,
    pub catalog: &'a IngredientCatalog,
    pub logos: &'a LogoCatalog,
    pub collected: &'a BTreeSet<IngredientId>,
    /// `(collected, total)`
    pub candles: (u32, u32),
    pub cake_opacity: f32,
    pub celebration: CelebrationStage,
    /// Ingredients shown in the bowl on the cake screen
    pub dropped: usize,
    pub active: bool,
}

pub struct Simulation<R: Rng = Pcg32> {
    state: GameState,
    session: Session,
    tuning: Tuning,
    catalog: IngredientCatalog,
    logos: LogoCatalog,
    rng: R,
    events: Vec<GameEvent>,
    celebration: Celebration,
    /// Seconds of active simulation since the last start
    clock: f64,
    last_jump: Option<f64>,
    /// Viewport reported while a run was active, applied on the next reset
    pending_viewport: Option<(f32, f32)>,
}

impl Simulation<Pcg32> {
    /// Default tuning and catalogs with a seeded PCG generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(
            Tuning::default(),
            IngredientCatalog::default(),
            LogoCatalog::default(),
            Pcg32::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> Simulation<R> {
    /// Invalid tuning is logged and replaced by the defaults
    pub fn new(tuning: Tuning, catalog: IngredientCatalog, logos: LogoCatalog, rng: R) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(err) => {
                log::warn!("Ignoring invalid tuning: {}", err);
                Tuning::default()
            }
        };
        let state = GameState::new(0.0, 0.0, &tuning);
        Self {
            state,
            session: Session::Uninitialized,
            tuning,
            catalog,
            logos,
            rng,
            events: Vec::new(),
            celebration: Celebration::default(),
            clock: 0.0,
            last_jump: None,
            pending_viewport: None,
        }
    }

    /// Rebuild the state at rest for a viewport. An active session stays active.
    pub fn init(&mut self, width: f32, height: f32) {
        self.state = GameState::new(width, height, &self.tuning);
        self.celebration = Celebration::default();
        self.last_jump = None;
        self.pending_viewport = None;
        if self.session == Session::Uninitialized {
            self.session = Session::Ready;
        }
        log::info!("Simulation initialized ({}x{})", width, height);
    }

    /// The render surface changed size.
    ///
    /// Outside a run the state is rebuilt right away. During a run the new
    /// viewport is held until the next reset so progress is not lost.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.session == Session::Active {
            log::debug!("Viewport {}x{} deferred until reset", width, height);
            self.pending_viewport = Some((width, height));
        } else {
            self.init(width, height);
        }
    }

    /// Begin play, clearing anything left over from a previous run
    pub fn start(&mut self) {
        if self.session == Session::Uninitialized {
            log::warn!("start() called before init(); ignoring");
            return;
        }
        self.state.clear_session();
        self.celebration = Celebration::default();
        self.clock = 0.0;
        self.last_jump = None;
        self.session = Session::Active;
        log::info!("Session started");
    }

    /// Advance one frame. No-op unless active; terminal states only animate the celebration.
    pub fn advance(&mut self, dt: f32) {
        if self.session != Session::Active || !(dt >= 0.0) {
            return;
        }

        if !self.state.is_terminal() {
            self.clock += f64::from(dt);
            let mut env = TickEnv {
                tuning: &self.tuning,
                catalog: &self.catalog,
                logos: &self.logos,
                rng: &mut self.rng,
                events: &mut self.events,
            };
            let outcome = tick(&mut self.state, &mut env, dt);

            if outcome.crashed {
                log::info!("Game over with score {}", self.state.score);
            }
            if outcome.revealed {
                log::info!("Cake revealed after {:.1}s", self.clock);
                self.celebration
                    .begin(self.state.progress.ingredients.len(), &mut self.events);
            }
        }

        if self.state.is_final_cake_shown {
            self.celebration
                .advance(dt, self.tuning.fade_rate, &mut self.events);
        }
    }

    /// Upward impulse. Returns false when ignored (inactive, terminal or debounced).
    pub fn apply_jump(&mut self) -> bool {
        if self.session != Session::Active || self.state.is_terminal() {
            return false;
        }
        let debounce = f64::from(self.tuning.jump_debounce);
        if let Some(last) = self.last_jump {
            if debounce > 0.0 && self.clock - last < debounce {
                return false;
            }
        }
        self.state.velocity = -self.state.jump_power;
        self.last_jump = Some(self.clock);
        self.events.push(GameEvent::Jumped);
        true
    }

    /// `init` with the current (or last deferred) viewport followed by `start`
    pub fn reset(&mut self) {
        if self.session == Session::Uninitialized {
            log::warn!("reset() called before init(); ignoring");
            return;
        }
        let (width, height) = self
            .pending_viewport
            .take()
            .unwrap_or((self.state.width, self.state.height));
        self.init(width, height);
        self.start();
    }

    /// Apply a resolved player intent
    pub fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Start => self.start(),
            Intent::Jump => {
                self.apply_jump();
            }
            Intent::Restart => self.reset(),
            Intent::Ignore => {}
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn is_active(&self) -> bool {
        self.session == Session::Active
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn catalog(&self) -> &IngredientCatalog {
        &self.catalog
    }

    pub fn logos(&self) -> &LogoCatalog {
        &self.logos
    }

    pub fn collected_ingredients(&self) -> &BTreeSet<IngredientId> {
        &self.state.progress.ingredients
    }

    /// `(collected, total)`
    pub fn candle_progress(&self) -> (u32, u32) {
        (self.state.progress.candles, self.tuning.candles_count)
    }

    pub fn cake_opacity(&self) -> f32 {
        self.celebration.opacity
    }

    pub fn celebration(&self) -> &Celebration {
        &self.celebration
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: &self.state,
            tuning: &self.tuning,
            catalog: &self.catalog,
            logos: &self.logos,
            collected: &self.state.progress.ingredients,
            candles: self.candle_progress(),
            cake_opacity: self.celebration.opacity,
            celebration: self.celebration.stage,
            dropped: self.celebration.dropped(),
            active: self.is_active(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Collectible, ItemKind, WinDebounce};

    fn running() -> Simulation {
        let mut sim = Simulation::seeded(42);
        sim.init(400.0, 600.0);
        sim.start();
        sim
    }

    fn complete_objective(sim: &mut Simulation) {
        let ids: Vec<_> = sim.catalog.ids().collect();
        for id in ids {
            sim.state.progress.collect_ingredient(id);
        }
        sim.state.progress.candles = sim.tuning.candles_count;
    }

    #[test]
    fn test_calls_before_init_are_noops() {
        let mut sim = Simulation::seeded(1);
        let before = sim.state().clone();
        sim.start();
        sim.advance(0.02);
        assert!(!sim.apply_jump());
        sim.reset();
        assert_eq!(sim.session(), Session::Uninitialized);
        assert_eq!(sim.state(), &before);
    }

    #[test]
    fn test_ready_does_not_simulate() {
        let mut sim = Simulation::seeded(1);
        sim.init(400.0, 600.0);
        assert_eq!(sim.session(), Session::Ready);
        let before = sim.state().clone();
        sim.advance(0.02);
        assert!(!sim.apply_jump());
        assert_eq!(sim.state(), &before);
    }

    #[test]
    fn test_falls_without_input_and_no_early_spawn() {
        let mut sim = running();
        let y0 = sim.state().player_y;
        for _ in 0..40 {
            sim.advance(0.02);
        }
        let st = sim.state();
        assert!(st.velocity > 0.0);
        assert!(st.player_y > y0);
        assert!(st.obstacles.is_empty());
    }

    #[test]
    fn test_jump_sets_velocity() {
        let mut sim = running();
        sim.advance(0.02);
        assert!(sim.apply_jump());
        assert_eq!(sim.state().velocity, -420.0);
        assert_eq!(sim.drain_events().collect::<Vec<_>>(), vec![GameEvent::Jumped]);
    }

    #[test]
    fn test_jump_debounce() {
        let mut sim = running();
        assert!(sim.apply_jump());
        // Same frame: duplicate from a second input source
        assert!(!sim.apply_jump());
        for _ in 0..5 {
            sim.advance(0.02);
        }
        assert!(!sim.apply_jump());
        for _ in 0..6 {
            sim.advance(0.02);
        }
        assert!(sim.apply_jump());
    }

    #[test]
    fn test_jump_debounce_disabled() {
        let mut sim = running();
        sim.tuning.jump_debounce = 0.0;
        assert!(sim.apply_jump());
        assert!(sim.apply_jump());
    }

    #[test]
    fn test_no_jump_when_game_over() {
        let mut sim = running();
        sim.state.is_game_over = true;
        sim.state.velocity = 50.0;
        assert!(!sim.apply_jump());
        assert_eq!(sim.state().velocity, 50.0);
    }

    #[test]
    fn test_game_over_sticks_until_reset() {
        let mut sim = running();
        for _ in 0..200 {
            sim.advance(0.02);
        }
        assert!(sim.state().is_game_over);
        let frozen = sim.state().clone();
        sim.advance(0.02);
        assert_eq!(sim.state(), &frozen);

        sim.reset();
        let st = sim.state();
        assert!(!st.is_game_over);
        assert!(!st.is_final_cake_shown);
        assert_eq!(st.score, 0);
        assert!(st.obstacles.is_empty());
        assert!(st.items.is_empty());
        assert_eq!(st.player_y, 300.0);
        assert!(sim.is_active());
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut sim = running();
        sim.state.score = 3;
        sim.state.items.push(Collectible {
            id: 9,
            x: 10.0,
            y: 10.0,
            kind: ItemKind::Candle,
            speed: 200.0,
            collected: false,
        });
        sim.start();
        sim.start();
        assert_eq!(sim.state().score, 0);
        assert!(sim.state().items.is_empty());
        assert!(sim.is_active());
    }

    #[test]
    fn test_win_after_debounce_window() {
        let mut sim = running();
        complete_objective(&mut sim);

        for _ in 0..25 {
            sim.advance(0.02);
            assert!(!sim.state().is_final_cake_shown);
        }
        assert!(matches!(sim.state().win, WinDebounce::Debouncing { .. }));

        sim.advance(0.02);
        sim.advance(0.02);
        let st = sim.state();
        assert!(st.is_final_cake_shown);
        assert!(st.obstacles.is_empty());
        assert!(st.items.is_empty());
        assert!(sim.cake_opacity() > 0.0);

        let events: Vec<_> = sim.drain_events().collect();
        assert!(events.contains(&GameEvent::CakeRevealed));
        assert!(events.contains(&GameEvent::IngredientDropped(0)));
    }

    #[test]
    fn test_cake_state_frozen_while_fading() {
        let mut sim = running();
        complete_objective(&mut sim);
        for _ in 0..30 {
            sim.advance(0.02);
        }
        assert!(sim.state().is_final_cake_shown);
        let frozen = sim.state().clone();
        let opacity = sim.cake_opacity();

        for _ in 0..10 {
            sim.advance(0.02);
        }
        assert_eq!(sim.state(), &frozen);
        assert!(sim.cake_opacity() > opacity);

        // Six drops, the shake and the cake take under five seconds
        for _ in 0..300 {
            sim.advance(0.02);
        }
        assert_eq!(sim.cake_opacity(), 1.0);
        assert_eq!(sim.celebration().stage, CelebrationStage::Cake);
    }

    #[test]
    fn test_restart_from_cake_screen() {
        let mut sim = running();
        complete_objective(&mut sim);
        for _ in 0..30 {
            sim.advance(0.02);
        }
        sim.apply_intent(Intent::Restart);
        assert!(!sim.state().is_final_cake_shown);
        assert!(sim.collected_ingredients().is_empty());
        assert_eq!(sim.candle_progress(), (0, 4));
        assert_eq!(sim.cake_opacity(), 0.0);
    }

    #[test]
    fn test_snapshot_reflects_progress() {
        let mut sim = running();
        sim.state.progress.collect_ingredient(IngredientId(1));
        sim.state.progress.candles = 2;
        let snap = sim.snapshot();
        assert!(snap.active);
        assert_eq!(snap.candles, (2, 4));
        assert!(snap.collected.contains(&IngredientId(1)));
        assert_eq!(snap.catalog.len(), 6);
        assert_eq!(snap.celebration, CelebrationStage::Hidden);
    }

    #[test]
    fn test_resize_during_run_keeps_progress() {
        let mut sim = running();
        sim.state.progress.collect_ingredient(IngredientId(0));
        sim.state.score = 5;
        sim.resize(500.0, 700.0);
        assert!(sim.is_active());
        assert_eq!(sim.state().score, 5);
        assert_eq!(sim.collected_ingredients().len(), 1);
        assert_eq!(sim.state().width, 400.0);

        sim.reset();
        assert_eq!(sim.state().width, 500.0);
        assert_eq!(sim.state().height, 700.0);
        assert_eq!(sim.state().score, 0);

        // Consumed by the reset
        sim.reset();
        assert_eq!(sim.state().width, 500.0);
    }

    #[test]
    fn test_resize_before_run_applies_at_once() {
        let mut sim = Simulation::seeded(3);
        sim.resize(320.0, 480.0);
        assert_eq!(sim.session(), Session::Ready);
        assert_eq!(sim.state().height, 480.0);
        sim.resize(400.0, 600.0);
        assert_eq!(sim.state().width, 400.0);
        assert_eq!(sim.state().player_y, 300.0);
    }

    #[test]
    fn test_invalid_tuning_falls_back_to_defaults() {
        let tuning = Tuning {
            logo_size: 1e-6,
            gravity: 900.0,
            ..Default::default()
        };
        let sim = Simulation::new(
            tuning,
            IngredientCatalog::default(),
            LogoCatalog::default(),
            Pcg32::seed_from_u64(1),
        );
        assert_eq!(sim.tuning(), &Tuning::default());
    }

    #[test]
    fn test_negative_dt_ignored() {
        let mut sim = running();
        let before = sim.state().clone();
        sim.advance(-1.0);
        sim.advance(f32::NAN);
        assert_eq!(sim.state(), &before);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn terminal_advance_is_noop(seed in 0u64..1000, dt in 0.0f32..0.05, won in any::<bool>()) {
                let mut sim = Simulation::seeded(seed);
                sim.init(400.0, 600.0);
                sim.start();
                for _ in 0..10 {
                    sim.advance(0.02);
                }
                if won {
                    sim.state.is_final_cake_shown = true;
                } else {
                    sim.state.is_game_over = true;
                }
                let before = sim.state().clone();
                sim.advance(dt);
                prop_assert_eq!(sim.state(), &before);
            }

            #[test]
            fn inactive_advance_is_noop(seed in 0u64..1000, dt in 0.0f32..1.0) {
                let mut sim = Simulation::seeded(seed);
                sim.init(400.0, 600.0);
                let before = sim.state().clone();
                sim.advance(dt);
                prop_assert_eq!(sim.state(), &before);
            }

            #[test]
            fn euler_velocity(n in 1usize..20, dt in 0.001f32..0.01) {
                // Start high with a tall viewport so no boundary is touched
                let mut sim = Simulation::seeded(0);
                sim.init(400.0, 100_000.0);
                sim.start();
                let v0 = sim.state().velocity;
                for _ in 0..n {
                    sim.advance(dt);
                }
                let expected = v0 + n as f32 * 1300.0 * dt;
                prop_assert!((sim.state().velocity - expected).abs() < 1e-2);
            }

            #[test]
            fn jump_overrides_velocity(v in -2000.0f32..2000.0) {
                let mut sim = Simulation::seeded(0);
                sim.init(400.0, 600.0);
                sim.start();
                sim.state.velocity = v;
                prop_assert!(sim.apply_jump());
                prop_assert_eq!(sim.state().velocity, -420.0);
            }

            #[test]
            fn invariants_hold_under_random_play(
                seed in 0u64..500,
                jumps in proptest::collection::vec(any::<bool>(), 100..400)
            ) {
                let mut sim = Simulation::seeded(seed);
                sim.init(400.0, 600.0);
                sim.start();
                for &jump in &jumps {
                    if jump {
                        sim.apply_jump();
                    }
                    sim.advance(1.0 / 60.0);
                    let st = sim.state();
                    prop_assert!(st.player_y >= 0.0 && st.player_y <= st.height);
                    prop_assert!(st.progress.candles <= sim.tuning().candles_count);
                    for pair in st.obstacles.windows(2) {
                        prop_assert!(pair[0].x <= pair[1].x);
                    }
                }
            }

            #[test]
            fn collecting_everything_drip_feeds_in_order(seed in 0u64..200) {
                let mut sim = Simulation::seeded(seed);
                sim.init(400.0, 600.0);
                sim.start();
                let half_item = sim.tuning().item_size / 2.0;
                let mut seen = BTreeSet::new();
                let mut spawned: Vec<ItemKind> = Vec::new();

                for _ in 0..3000 {
                    // Pipes only get in the way of steering onto each item
                    sim.state.obstacles.clear();
                    sim.state.player_y = match sim.state.items.iter().find(|i| !i.collected) {
                        Some(target) => target.y + half_item,
                        None => sim.state.height / 2.0,
                    };
                    sim.state.velocity = 0.0;
                    sim.advance(1.0 / 60.0);

                    let st = sim.state();
                    prop_assert!(!st.is_game_over);
                    prop_assert!(st.items.iter().filter(|i| i.is_live_candle()).count() <= 1);
                    for item in &st.items {
                        if seen.insert(item.id) {
                            spawned.push(item.kind);
                        }
                    }
                    if st.is_final_cake_shown {
                        break;
                    }
                }

                let mut expected: Vec<ItemKind> =
                    sim.catalog().ids().map(ItemKind::Ingredient).collect();
                expected.extend(std::iter::repeat_n(ItemKind::Candle, 4));
                prop_assert_eq!(spawned, expected);
                prop_assert_eq!(sim.collected_ingredients().len(), 6);
                prop_assert_eq!(sim.candle_progress(), (4, 4));
                prop_assert!(sim.state().is_final_cake_shown);
            }
        }
    }
}
