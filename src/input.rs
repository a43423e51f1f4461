//! Player input resolution
//!
//! Keyboard and pointer events arrive as [`InputAction`]s. They are resolved
//! against the current session into one [`Intent`] the simulation applies,
//! so restart handling never lives in the event listeners.

use glam::Vec2;

use crate::sim::{Aabb, GameState};

/// Size of the "Celebrate Again" button on the cake screen
pub const CELEBRATE_BUTTON_SIZE: Vec2 = Vec2::new(180.0, 50.0);
/// Offset of the button's top edge below the vertical centre
pub const CELEBRATE_BUTTON_OFFSET: f32 = 60.0;

/// Raw input from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Space bar or other jump key
    Jump,
    /// Pointer press at canvas coordinates
    Pointer { x: f32, y: f32 },
}

/// What the simulation should do with an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    Jump,
    Restart,
    Ignore,
}

/// Hit area of the restart button on the cake screen
pub fn celebrate_button(width: f32, height: f32) -> Aabb {
    Aabb::from_origin_size(
        width / 2.0 - CELEBRATE_BUTTON_SIZE.x / 2.0,
        height / 2.0 + CELEBRATE_BUTTON_OFFSET,
        CELEBRATE_BUTTON_SIZE.x,
        CELEBRATE_BUTTON_SIZE.y,
    )
}

/// Map an action to an intent given the session state
pub fn resolve(action: InputAction, active: bool, state: &GameState) -> Intent {
    if !active {
        return Intent::Start;
    }
    if state.is_game_over {
        return Intent::Restart;
    }
    if state.is_final_cake_shown {
        return match action {
            InputAction::Pointer { x, y }
                if celebrate_button(state.width, state.height).contains(Vec2::new(x, y)) =>
            {
                Intent::Restart
            }
            _ => Intent::Ignore,
        };
    }
    Intent::Jump
}
