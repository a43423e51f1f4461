//! Per-frame simulation step
//!
//! Advances a running, non-terminal [`GameState`] by `dt` seconds:
//! physics, boundary policy, spawning, obstacle and collectible scrolling,
//! collisions, pickups and the debounced win check, in that order.

use rand::Rng;

use super::spawn::spawn_obstacle;
use super::state::{
    GameEvent, GameState, IngredientCatalog, ItemKind, LogoCatalog, WinDebounce,
};
use crate::tuning::{BoundaryPolicy, Tuning};

/// Everything a step reads or writes besides the state itself
pub struct TickEnv<'a, R: Rng> {
    pub tuning: &'a Tuning,
    pub catalog: &'a IngredientCatalog,
    pub logos: &'a LogoCatalog,
    pub rng: &'a mut R,
    pub events: &'a mut Vec<GameEvent>,
}

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// The run failed during this step
    pub crashed: bool,
    /// The cake was revealed during this step
    pub revealed: bool,
}

/// Set the failure flag once, emitting a single crash event
fn crash(state: &mut GameState, events: &mut Vec<GameEvent>, outcome: &mut TickOutcome) {
    if !state.is_game_over {
        state.is_game_over = true;
        outcome.crashed = true;
        events.push(GameEvent::Crashed);
    }
}

/// Advance the state by `dt`. Callers must skip terminal states.
pub fn tick<R: Rng>(state: &mut GameState, env: &mut TickEnv<'_, R>, dt: f32) -> TickOutcome {
    let tuning = env.tuning;
    let mut outcome = TickOutcome::default();

    // Explicit Euler
    state.velocity += state.gravity * dt;
    state.player_y += state.velocity * dt;

    match tuning.boundary {
        BoundaryPolicy::ClampAndFail => {
            let half = tuning.player_half();
            if state.player_y < half {
                state.player_y = half;
                state.velocity = 0.0;
            }
            if state.player_y > state.height - half {
                state.player_y = state.height - half;
                crash(state, env.events, &mut outcome);
            }
        }
        BoundaryPolicy::WrapAround => {
            if state.height > 0.0 && !(0.0..=state.height).contains(&state.player_y) {
                state.player_y = state.player_y.rem_euclid(state.height);
            }
        }
    }

    state.obstacle_timer += dt;
    if state.obstacle_timer > state.obstacle_interval && !state.is_final_cake_shown {
        state.obstacle_timer = 0.0;
        spawn_obstacle(state, tuning, env.catalog, env.logos, env.rng);
    }

    // Obstacles: scroll, collide, retire
    let player = state.player_hitbox(tuning.player_size);
    let mut hit = false;
    let mut passed = 0u32;
    state.obstacles.retain_mut(|obs| {
        obs.x -= obs.speed(tuning.scroll_speed) * dt;
        if obs.hits(&player) {
            hit = true;
        }
        if obs.is_offscreen() {
            passed += 1;
            false
        } else {
            true
        }
    });
    if hit {
        crash(state, env.events, &mut outcome);
    }
    for _ in 0..passed {
        state.score += 1;
        env.events.push(GameEvent::ObstaclePassed { score: state.score });
    }

    // Collectibles: scroll, pick up, drop what is gone
    let item_size = tuning.item_size;
    for item in state.items.iter_mut().filter(|i| !i.collected) {
        item.x -= item.speed * dt;
        if !item.hitbox(item_size).overlaps(&player) {
            continue;
        }
        item.collected = true;
        match item.kind {
            ItemKind::Candle => {
                if state.progress.collect_candle(tuning.candles_count) {
                    env.events.push(GameEvent::CandleCollected {
                        collected: state.progress.candles,
                    });
                }
            }
            ItemKind::Ingredient(id) => {
                if state.progress.collect_ingredient(id) {
                    log::debug!("Collected {:?}", env.catalog.name(id));
                    env.events.push(GameEvent::IngredientCollected(id));
                }
            }
        }
    }
    state
        .items
        .retain(|i| !i.collected && i.x + item_size >= 0.0);

    // A crash this frame takes precedence over the win check
    if !state.is_game_over {
        outcome.revealed = update_win(state, tuning, env.catalog, env.events, dt);
    }

    outcome
}

/// Debounced win check; returns true on the frame the cake is revealed
fn update_win(
    state: &mut GameState,
    tuning: &Tuning,
    catalog: &IngredientCatalog,
    events: &mut Vec<GameEvent>,
    dt: f32,
) -> bool {
    let holds = state.progress.all_ingredients(catalog)
        && state.progress.candles >= tuning.candles_count
        && !state.candle_on_field();

    state.win = match (state.win, holds) {
        (WinDebounce::Triggered, _) => WinDebounce::Triggered,
        (_, false) => WinDebounce::Idle,
        (WinDebounce::Idle, true) => WinDebounce::Debouncing { elapsed: 0.0 },
        (WinDebounce::Debouncing { elapsed }, true) => {
            let elapsed = elapsed + dt;
            if elapsed >= tuning.win_delay {
                WinDebounce::Triggered
            } else {
                WinDebounce::Debouncing { elapsed }
            }
        }
    };

    if state.win == WinDebounce::Triggered && !state.is_final_cake_shown {
        state.is_final_cake_shown = true;
        state.obstacles.clear();
        state.items.clear();
        events.push(GameEvent::CakeRevealed);
        return true;
    }
    false
}
