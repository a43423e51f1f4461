//! Cake Flappy - a flappy-style birthday mini-game
//!
//! Core modules:
//! - `sim`: Simulation core (physics, spawning, collection objective, celebration)
//! - `scheduler`: Frame loop driving the simulation once per display refresh
//! - `input`: Maps key/pointer input to simulation intents
//! - `renderer`: Display list generation and the Canvas 2D backend
//! - `audio`: Procedural sound effects for simulation events
//! - `settings` / `tuning`: Data-driven configuration

pub mod audio;
pub mod input;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use input::{InputAction, Intent};
pub use scheduler::{FrameClock, FrameHost, FrameScheduler, SchedulerError};
pub use settings::Settings;
pub use sim::{GameEvent, GameState, Simulation, Snapshot};
pub use tuning::{Tuning, TuningError};
