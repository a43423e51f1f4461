//! Idle/demo mode - a simple pilot that plays the game
//!
//! Picks a target height from the nearest obstacle still ahead of the player
//! and jumps whenever the sprite is below it and not already climbing.

use super::state::{GameState, ObstacleKind};
use crate::tuning::Tuning;

/// Dead zone below the target before a jump is requested (px)
const JUMP_SLACK: f32 = 12.0;

/// Height the pilot wants to be at
pub fn target_y(state: &GameState, tuning: &Tuning) -> f32 {
    let player_left = state.player_x - tuning.player_half();
    let next = state
        .obstacles
        .iter()
        .find(|o| o.x + o.width() >= player_left);

    match next.map(|o| &o.kind) {
        Some(ObstacleKind::GapPipe {
            gap_y, gap_height, ..
        }) => gap_y + gap_height / 2.0,
        Some(ObstacleKind::PointHazard { y, size, .. }) => {
            // Pass on whichever side has more room
            let above = *y;
            let below = state.height - (y + size);
            if above > below {
                above / 2.0
            } else {
                y + size + below / 2.0
            }
        }
        None => state.height / 2.0,
    }
}

/// Whether the pilot jumps this frame
pub fn wants_jump(state: &GameState, tuning: &Tuning) -> bool {
    if state.is_terminal() {
        return false;
    }
    state.player_y > target_y(state, tuning) + JUMP_SLACK && state.velocity >= 0.0
}
