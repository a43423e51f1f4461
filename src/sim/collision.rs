//! Axis-aligned collision geometry
//!
//! Everything in the playfield is a rectangle in screen space (y grows
//! downward): the player hitbox, the solid parts of a pipe, point hazards and
//! collectibles. Overlap is strict, so rectangles that only share an edge do
//! not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box from its top-left corner and size
    pub fn from_origin_size(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    /// Square box centred on a point
    pub fn centered(center: Vec2, side: f32) -> Self {
        let half = Vec2::splat(side / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict interior overlap test
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Inclusive point containment (used for button hit-testing)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Solid regions of a gap pipe: the column above the gap and the column below it
///
/// Either region may be empty (zero height) when the gap touches a viewport edge.
pub fn pipe_solids(x: f32, width: f32, gap_y: f32, gap_height: f32, viewport_height: f32) -> [Aabb; 2] {
    let gap_bottom = gap_y + gap_height;
    [
        Aabb::new(Vec2::new(x, 0.0), Vec2::new(x + width, gap_y.max(0.0))),
        Aabb::new(
            Vec2::new(x, gap_bottom),
            Vec2::new(x + width, viewport_height.max(gap_bottom)),
        ),
    ]
}

/// Whether a player hitbox touches the solid part of a gap pipe
///
/// Checked against the gap directly rather than via [`pipe_solids`] so a
/// player above the viewport top still counts as a hit.
pub fn player_hits_pipe(player: &Aabb, x: f32, width: f32, gap_y: f32, gap_height: f32) -> bool {
    player.max.x > x
        && player.min.x < x + width
        && (player.min.y < gap_y || player.max.y > gap_y + gap_height)
}
