//! Obstacle and collectible spawning
//!
//! Obstacles enter at the right edge of the viewport. Each one may carry a
//! single collectible: the next uncollected ingredient in catalog order, or
//! once those are done, a candle (only one candle is ever live at a time).

use rand::Rng;

use super::state::{
    Collectible, GameState, IngredientCatalog, ItemKind, LogoCatalog, LogoId, Obstacle,
    ObstacleKind,
};
use crate::tuning::{ObstacleShape, Tuning};

/// Upper bound on logos stacked in one pipe column
const MAX_LOGO_STACK: usize = 64;

/// Uniform sample in `[min, max)`, collapsing to `min` when the range is empty
fn random_between<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

fn random_logo<R: Rng>(rng: &mut R, logos: &LogoCatalog) -> Option<LogoId> {
    if logos.is_empty() {
        None
    } else {
        logos.id(rng.random_range(0..logos.len()))
    }
}

fn logo_stack<R: Rng>(rng: &mut R, logos: &LogoCatalog, span: f32, logo_size: f32) -> Vec<LogoId> {
    let count = ((span.max(0.0) / logo_size).floor() as usize).min(MAX_LOGO_STACK);
    (0..count).filter_map(|_| random_logo(rng, logos)).collect()
}

/// Which collectible, if any, the next obstacle should carry
pub fn next_collectible(
    state: &GameState,
    tuning: &Tuning,
    catalog: &IngredientCatalog,
) -> Option<ItemKind> {
    if let Some(id) = state.progress.next_ingredient(catalog) {
        Some(ItemKind::Ingredient(id))
    } else if state.progress.candles < tuning.candles_count && !state.candle_on_field() {
        Some(ItemKind::Candle)
    } else {
        None
    }
}

/// Build an obstacle at the right edge using the configured shape
fn build_obstacle<R: Rng>(
    state: &mut GameState,
    tuning: &Tuning,
    logos: &LogoCatalog,
    rng: &mut R,
) -> Obstacle {
    let id = state.next_entity_id();
    let kind = match tuning.obstacle_shape {
        ObstacleShape::GapPipe {
            width,
            gap_height,
            margin,
        } => {
            let gap_y = random_between(rng, margin, state.height - gap_height - margin);
            let below = state.height - (gap_y + gap_height);
            ObstacleKind::GapPipe {
                width,
                gap_y,
                gap_height,
                logos_top: logo_stack(rng, logos, gap_y, tuning.logo_size),
                logos_bottom: logo_stack(rng, logos, below, tuning.logo_size),
            }
        }
        ObstacleShape::PointHazard {
            size,
            speed,
            margin,
        } => ObstacleKind::PointHazard {
            y: random_between(rng, margin, state.height - size - margin),
            size,
            speed,
            logo: random_logo(rng, logos),
        },
    };

    Obstacle {
        id,
        x: state.width,
        kind,
    }
}

/// Where a collectible riding on `obstacle` sits (top-left corner)
fn collectible_anchor(obstacle: &Obstacle, item_size: f32, viewport_height: f32) -> (f32, f32) {
    let x = obstacle.x + obstacle.width() / 2.0 - item_size / 2.0;
    let y = match obstacle.kind {
        ObstacleKind::GapPipe {
            gap_y, gap_height, ..
        } => gap_y + gap_height / 2.0 - item_size / 2.0,
        ObstacleKind::PointHazard { y, size, .. } => {
            // Opposite side of the hazard, one item-height of clearance
            let y = if y + size / 2.0 < viewport_height / 2.0 {
                y + size + item_size
            } else {
                y - item_size * 2.0
            };
            y.clamp(0.0, (viewport_height - item_size).max(0.0))
        }
    };
    (x, y)
}

/// Spawn one obstacle (plus at most one collectible). Never spawns after the cake is shown.
pub fn spawn_obstacle<R: Rng>(
    state: &mut GameState,
    tuning: &Tuning,
    catalog: &IngredientCatalog,
    logos: &LogoCatalog,
    rng: &mut R,
) {
    if state.is_final_cake_shown {
        return;
    }

    let obstacle = build_obstacle(state, tuning, logos, rng);
    let speed = obstacle.speed(tuning.scroll_speed);
    let anchor = collectible_anchor(&obstacle, tuning.item_size, state.height);
    log::debug!("Spawned obstacle {} at x={}", obstacle.id, obstacle.x);
    state.obstacles.push(obstacle);

    if let Some(kind) = next_collectible(state, tuning, catalog) {
        let id = state.next_entity_id();
        let (x, y) = anchor;
        log::debug!("Attached {:?} to obstacle", kind);
        state.items.push(Collectible {
            id,
            x,
            y,
            kind,
            speed,
            collected: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::IngredientId;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (GameState, Tuning, IngredientCatalog, LogoCatalog, Pcg32) {
        let tuning = Tuning::default();
        (
            GameState::new(400.0, 600.0, &tuning),
            tuning,
            IngredientCatalog::default(),
            LogoCatalog::default(),
            Pcg32::seed_from_u64(7),
        )
    }

    #[test]
    fn test_gap_pipe_within_margins() {
        let (mut state, tuning, catalog, logos, mut rng) = setup();
        for _ in 0..50 {
            spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        }
        for obs in &state.obstacles {
            assert_eq!(obs.x, 400.0);
            match &obs.kind {
                ObstacleKind::GapPipe {
                    gap_y,
                    gap_height,
                    logos_top,
                    logos_bottom,
                    ..
                } => {
                    assert!(*gap_y >= 50.0 && *gap_y <= 600.0 - 180.0 - 50.0);
                    assert_eq!(logos_top.len(), (gap_y / 32.0).floor() as usize);
                    let below = 600.0 - (gap_y + gap_height);
                    assert_eq!(logos_bottom.len(), (below / 32.0).floor() as usize);
                }
                other => panic!("unexpected obstacle {other:?}"),
            }
        }
    }

    #[test]
    fn test_logo_stack_is_bounded() {
        let (mut state, mut tuning, catalog, logos, mut rng) = setup();
        tuning.logo_size = 1e-6;
        spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        let ObstacleKind::GapPipe {
            logos_top,
            logos_bottom,
            ..
        } = &state.obstacles[0].kind
        else {
            panic!("expected gap pipe");
        };
        assert_eq!(logos_top.len(), MAX_LOGO_STACK);
        assert_eq!(logos_bottom.len(), MAX_LOGO_STACK);
    }

    #[test]
    fn test_empty_logo_catalog_does_not_crash() {
        let (mut state, tuning, catalog, _, mut rng) = setup();
        let logos = LogoCatalog::from_names(Vec::<String>::new());
        spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        match &state.obstacles[0].kind {
            ObstacleKind::GapPipe {
                logos_top,
                logos_bottom,
                ..
            } => {
                assert!(logos_top.is_empty());
                assert!(logos_bottom.is_empty());
            }
            other => panic!("unexpected obstacle {other:?}"),
        }
    }

    #[test]
    fn test_first_spawn_carries_first_ingredient_in_gap() {
        let (mut state, tuning, catalog, logos, mut rng) = setup();
        spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        assert_eq!(state.items.len(), 1);
        let item = &state.items[0];
        assert_eq!(item.kind, ItemKind::Ingredient(IngredientId(0)));
        assert_eq!(item.x, 400.0 + 30.0 - 16.0);
        if let ObstacleKind::GapPipe {
            gap_y, gap_height, ..
        } = state.obstacles[0].kind
        {
            assert_eq!(item.y, gap_y + gap_height / 2.0 - 16.0);
        }
    }

    #[test]
    fn test_candle_only_after_ingredients_and_one_at_a_time() {
        let (mut state, tuning, catalog, logos, mut rng) = setup();
        for id in catalog.ids() {
            state.progress.collect_ingredient(id);
        }
        spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        assert_eq!(state.obstacles.len(), 2);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].kind, ItemKind::Candle);
    }

    #[test]
    fn test_nothing_attached_when_objective_complete() {
        let (mut state, tuning, catalog, logos, mut rng) = setup();
        for id in catalog.ids() {
            state.progress.collect_ingredient(id);
        }
        state.progress.candles = tuning.candles_count;
        spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_no_spawn_after_cake_shown() {
        let (mut state, tuning, catalog, logos, mut rng) = setup();
        state.is_final_cake_shown = true;
        spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        assert!(state.obstacles.is_empty());
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_point_hazard_item_rides_along() {
        let (mut state, mut tuning, catalog, logos, mut rng) = setup();
        tuning.obstacle_shape = ObstacleShape::point_hazard();
        for _ in 0..20 {
            spawn_obstacle(&mut state, &tuning, &catalog, &logos, &mut rng);
        }
        for obs in &state.obstacles {
            let ObstacleKind::PointHazard { y, size, logo, .. } = obs.kind else {
                panic!("expected point hazard");
            };
            assert!(y >= 50.0 && y + size <= 600.0 - 50.0);
            assert!(logo.is_some());
        }
        // Nothing collected yet, so every hazard carries an ingredient
        assert_eq!(state.items.len(), state.obstacles.len());
        for (item, obs) in state.items.iter().zip(&state.obstacles) {
            assert_eq!(item.speed, 300.0);
            assert!(item.y >= 0.0 && item.y + 32.0 <= 600.0);
            assert!(!obs.hits(&item.hitbox(tuning.item_size)));
        }
    }
}
