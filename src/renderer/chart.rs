//! Price chart backdrop
//!
//! A random-walk line that scrolls behind the playfield. It only feeds the
//! renderer and never touches the simulation, so it owns its own generator.

use rand::Rng;
use rand_pcg::Pcg32;

/// Samples across the viewport width
pub const CHART_POINTS: usize = 150;
/// Seconds between samples
const SAMPLE_INTERVAL: f32 = 0.009;
/// Largest move of one sample, either direction (px)
const MAX_STEP: f32 = 10.0;
/// Distance the line keeps from the top and bottom edges (px)
const EDGE_MARGIN: f32 = 50.0;

pub struct PriceChart<R: Rng = Pcg32> {
    /// Oldest first
    points: Vec<f32>,
    timer: f32,
    height: f32,
    rng: R,
}

impl<R: Rng> PriceChart<R> {
    /// Flat line at mid-height
    pub fn new(height: f32, rng: R) -> Self {
        let mut chart = Self {
            points: Vec::with_capacity(CHART_POINTS),
            timer: 0.0,
            height,
            rng,
        };
        chart.reset(height);
        chart
    }

    /// Flatten the line for a (possibly new) viewport height
    pub fn reset(&mut self, height: f32) {
        self.height = height;
        self.timer = 0.0;
        self.points.clear();
        self.points.resize(CHART_POINTS, height / 2.0);
    }

    /// Advance the walk; at most one new sample per call
    pub fn update(&mut self, dt: f32) {
        self.timer += dt;
        if self.timer < SAMPLE_INTERVAL {
            return;
        }
        self.timer = 0.0;

        let last = self.points.last().copied().unwrap_or(self.height / 2.0);
        let step = self.rng.random_range(-MAX_STEP..MAX_STEP);
        let low = EDGE_MARGIN.min(self.height / 2.0);
        let high = (self.height - EDGE_MARGIN).max(low);
        self.points.rotate_left(1);
        if let Some(newest) = self.points.last_mut() {
            *newest = (last + step).clamp(low, high);
        }
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }
}
