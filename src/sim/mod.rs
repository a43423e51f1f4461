//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable `dt` supplied by the host, no clock reads
//! - Injected RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod celebration;
pub mod collision;
pub mod engine;
pub mod spawn;
pub mod state;
pub mod tick;

pub use celebration::{BOWL_SHAKE_DURATION, Celebration, CelebrationStage, DROP_INTERVAL};
pub use collision::{Aabb, pipe_solids, player_hits_pipe};
pub use engine::{Session, Simulation, Snapshot};
pub use spawn::{next_collectible, spawn_obstacle};
pub use state::{
    CANDLE_NAME, CakeProgress, Collectible, GameEvent, GameState, IngredientCatalog,
    IngredientId, ItemKind, LogoCatalog, LogoId, Obstacle, ObstacleKind, WinDebounce,
};
pub use tick::{TickEnv, TickOutcome, tick};
