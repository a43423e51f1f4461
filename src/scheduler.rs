//! Frame scheduler
//!
//! Drives [`Simulation::advance`] once per display refresh. The host's
//! scheduling primitive (`requestAnimationFrame` in the browser) sits behind
//! [`FrameHost`] so the loop can be exercised without a window.

use rand::Rng;
use thiserror::Error;

use crate::sim::{Simulation, Snapshot};

/// Display-refresh callback primitive
pub trait FrameHost {
    /// Opaque id of a scheduled callback
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Schedule the next frame callback. `None` if the host refused.
    fn request_frame(&mut self) -> Option<Self::Handle>;

    /// Cancel a callback that has not fired yet
    fn cancel_frame(&mut self, handle: Self::Handle);
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("render surface unavailable")]
    SurfaceUnavailable,
    #[error("host refused to schedule a frame")]
    FrameRequestFailed,
}

/// Turns host timestamps into clamped simulation steps
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    last: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last: None,
            max_dt: max_dt.max(0.0),
        }
    }

    /// Seconds since the previous call, within `0..=max_dt`. The first call yields 0.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last {
            Some(prev) => ((now_ms - prev) / 1000.0) as f32,
            None => 0.0,
        };
        self.last = Some(now_ms);
        // f32::max drops NaN, so a bogus timestamp becomes a zero step
        dt.max(0.0).min(self.max_dt)
    }

    /// Forget the previous timestamp
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }
}

pub struct FrameScheduler<H: FrameHost> {
    host: H,
    clock: FrameClock,
    pending: Option<H::Handle>,
    running: bool,
}

impl<H: FrameHost> FrameScheduler<H> {
    pub fn new(host: H, max_dt: f32) -> Self {
        Self {
            host,
            clock: FrameClock::new(max_dt),
            pending: None,
            running: false,
        }
    }

    /// Begin the frame loop. Refuses to run without a render surface.
    pub fn start(&mut self, surface_ready: bool) -> Result<(), SchedulerError> {
        if !surface_ready {
            log::error!("Render surface unavailable; frame loop not started");
            return Err(SchedulerError::SurfaceUnavailable);
        }
        if self.running {
            return Ok(());
        }

        self.clock.reset();
        let handle = self
            .host
            .request_frame()
            .ok_or(SchedulerError::FrameRequestFailed)?;
        self.pending = Some(handle);
        self.running = true;
        log::info!("Frame loop started");
        Ok(())
    }

    /// Cancel the pending callback. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.host.cancel_frame(handle);
        }
        if self.running {
            self.running = false;
            log::info!("Frame loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle of the callback currently scheduled, if any
    pub fn pending(&self) -> Option<H::Handle> {
        self.pending
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Host callback body: advance, render, reschedule. Returns the step taken.
    pub fn on_frame<R, F>(&mut self, now_ms: f64, sim: &mut Simulation<R>, render: F) -> Option<f32>
    where
        R: Rng,
        F: FnOnce(Snapshot<'_>),
    {
        if !self.running {
            // Stale callback that fired after stop()
            return None;
        }
        self.pending = None;

        let dt = self.clock.delta(now_ms);
        sim.advance(dt);
        render(sim.snapshot());

        match self.host.request_frame() {
            Some(handle) => self.pending = Some(handle),
            None => {
                log::warn!("Host refused next frame; loop halted");
                self.running = false;
            }
        }
        Some(dt)
    }
}

impl<H: FrameHost> Drop for FrameScheduler<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
