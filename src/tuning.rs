//! Data-driven game balance
//!
//! Every physics constant, spawn cadence and objective size the simulation
//! reads comes from [`Tuning`]. Defaults match the shipped game; a host may
//! override any subset from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What happens when the player leaves the viewport vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Clamp into the viewport; touching the floor ends the run, the ceiling stops the climb
    #[default]
    ClampAndFail,
    /// Leaving one edge teleports the player to the opposite edge
    WrapAround,
}

/// Obstacle geometry strategy used by the spawner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ObstacleShape {
    /// Full-height column with a vertical gap the player flies through
    GapPipe {
        width: f32,
        gap_height: f32,
        /// Minimum distance between the gap and either viewport edge
        margin: f32,
    },
    /// A single square hazard that scrolls at its own speed
    PointHazard { size: f32, speed: f32, margin: f32 },
}

impl Default for ObstacleShape {
    fn default() -> Self {
        ObstacleShape::GapPipe {
            width: 60.0,
            gap_height: 180.0,
            margin: 50.0,
        }
    }
}

impl ObstacleShape {
    /// Default point-hazard geometry
    pub fn point_hazard() -> Self {
        ObstacleShape::PointHazard {
            size: 40.0,
            speed: 300.0,
            margin: 50.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Upward speed applied by a jump (px/s)
    pub jump_power: f32,
    /// Seconds between obstacle spawns
    pub obstacle_interval: f32,
    /// Leftward scroll speed for gap pipes and their collectibles (px/s)
    pub scroll_speed: f32,
    /// Side of the square player hitbox (px)
    pub player_size: f32,
    /// Player x as a fraction of viewport width
    pub player_x_ratio: f32,
    pub boundary: BoundaryPolicy,
    pub obstacle_shape: ObstacleShape,
    /// Height of one decorative logo in a pipe stack (px)
    pub logo_size: f32,
    /// Side of a collectible's square hitbox (px)
    pub item_size: f32,
    /// Candles required for the cake
    pub candles_count: u32,
    /// Seconds the win condition must hold before the cake is revealed
    pub win_delay: f32,
    /// Opacity units per second during the cake fade-in
    pub fade_rate: f32,
    /// Minimum seconds between accepted jumps (0 disables)
    pub jump_debounce: f32,
    /// Upper bound on a single frame step (s)
    pub max_frame_dt: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1300.0,
            jump_power: 420.0,
            obstacle_interval: 1.8,
            scroll_speed: 200.0,
            player_size: 32.0,
            player_x_ratio: 0.25,
            boundary: BoundaryPolicy::ClampAndFail,
            obstacle_shape: ObstacleShape::default(),
            logo_size: 32.0,
            item_size: 32.0,
            candles_count: 4,
            win_delay: 0.5,
            fade_rate: 1.0,
            jump_debounce: 0.2,
            max_frame_dt: 0.033,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }

        positive("gravity", self.gravity)?;
        positive("jump_power", self.jump_power)?;
        positive("obstacle_interval", self.obstacle_interval)?;
        positive("scroll_speed", self.scroll_speed)?;
        positive("player_size", self.player_size)?;
        if !(self.logo_size >= 1.0 && self.logo_size.is_finite()) {
            return Err(TuningError::Invalid {
                field: "logo_size",
                reason: "must be at least one pixel",
            });
        }
        positive("item_size", self.item_size)?;
        positive("fade_rate", self.fade_rate)?;
        positive("max_frame_dt", self.max_frame_dt)?;

        if !(0.0..=1.0).contains(&self.player_x_ratio) {
            return Err(TuningError::Invalid {
                field: "player_x_ratio",
                reason: "must be within 0..=1",
            });
        }
        if self.candles_count == 0 {
            return Err(TuningError::Invalid {
                field: "candles_count",
                reason: "at least one candle is required",
            });
        }
        if !(self.win_delay >= 0.0) {
            return Err(TuningError::Invalid {
                field: "win_delay",
                reason: "must not be negative",
            });
        }
        if !(self.jump_debounce >= 0.0) {
            return Err(TuningError::Invalid {
                field: "jump_debounce",
                reason: "must not be negative",
            });
        }

        match self.obstacle_shape {
            ObstacleShape::GapPipe {
                width, gap_height, ..
            } => {
                positive("obstacle_shape.width", width)?;
                positive("obstacle_shape.gap_height", gap_height)?;
            }
            ObstacleShape::PointHazard { size, speed, .. } => {
                positive("obstacle_shape.size", size)?;
                positive("obstacle_shape.speed", speed)?;
            }
        }

        Ok(())
    }

    /// Half the player hitbox side
    #[inline]
    pub fn player_half(&self) -> f32 {
        self.player_size / 2.0
    }
}
