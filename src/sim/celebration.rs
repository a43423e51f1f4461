//! Post-win celebration timeline
//!
//! Runs only after the cake is revealed and lives outside `GameState`, so the
//! terminal state stays frozen while the presentation keeps animating.

use serde::{Deserialize, Serialize};

use super::state::GameEvent;

/// Seconds between two ingredients dropping into the bowl
pub const DROP_INTERVAL: f32 = 0.6;
/// Seconds the bowl shakes before the cake appears
pub const BOWL_SHAKE_DURATION: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CelebrationStage {
    /// Nothing revealed yet
    #[default]
    Hidden,
    /// `dropped` ingredients are in the bowl
    Dropping { dropped: usize },
    BowlShake,
    Cake,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Celebration {
    /// Fade-in of the celebration screen, 0..=1
    pub opacity: f32,
    pub stage: CelebrationStage,
    /// Seconds spent in the current stage
    stage_time: f32,
    /// Ingredients to drop, fixed when the timeline begins
    total: usize,
}

impl Celebration {
    /// Start the timeline with `ingredient_count` ingredients to drop
    pub fn begin(&mut self, ingredient_count: usize, events: &mut Vec<GameEvent>) {
        self.opacity = 0.0;
        self.stage_time = 0.0;
        self.total = ingredient_count;
        self.stage = CelebrationStage::Dropping { dropped: 0 };
        self.drop_next(events);
    }

    pub fn is_active(&self) -> bool {
        self.stage != CelebrationStage::Hidden
    }

    /// Ingredients currently visible in the bowl
    pub fn dropped(&self) -> usize {
        match self.stage {
            CelebrationStage::Hidden => 0,
            CelebrationStage::Dropping { dropped } => dropped,
            CelebrationStage::BowlShake | CelebrationStage::Cake => self.total,
        }
    }

    fn drop_next(&mut self, events: &mut Vec<GameEvent>) {
        if let CelebrationStage::Dropping { dropped } = self.stage {
            if dropped < self.total {
                events.push(GameEvent::IngredientDropped(dropped));
                self.stage = CelebrationStage::Dropping {
                    dropped: dropped + 1,
                };
            }
        }
    }

    /// Advance fade and stage clock
    pub fn advance(&mut self, dt: f32, fade_rate: f32, events: &mut Vec<GameEvent>) {
        if !self.is_active() {
            return;
        }

        if self.opacity < 1.0 {
            self.opacity = (self.opacity + dt * fade_rate).min(1.0);
        }

        self.stage_time += dt;
        loop {
            match self.stage {
                CelebrationStage::Dropping { dropped } => {
                    // The last drop still gets a full interval before the shake
                    if self.stage_time < DROP_INTERVAL {
                        break;
                    }
                    self.stage_time -= DROP_INTERVAL;
                    if dropped < self.total {
                        self.drop_next(events);
                    } else {
                        self.stage = CelebrationStage::BowlShake;
                        events.push(GameEvent::BowlShake);
                    }
                }
                CelebrationStage::BowlShake => {
                    if self.stage_time < BOWL_SHAKE_DURATION {
                        break;
                    }
                    self.stage_time = 0.0;
                    self.stage = CelebrationStage::Cake;
                    events.push(GameEvent::CakeBaked);
                }
                CelebrationStage::Cake | CelebrationStage::Hidden => break,
            }
        }
    }
}
