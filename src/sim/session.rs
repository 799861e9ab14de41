//! Pause-aware frame driver
//!
//! Hosts hand in raw clock timestamps; the session turns them into game time
//! that stops while paused, so the ceiling doesn't lurch forward on resume.

use super::state::GamePhase;
use super::tick::{FrameReport, TickInput, World, tick};

/// Longest simulated step; keeps a falling body from skipping past the
/// down probe in one frame
pub const MAX_STEP_MS: f64 = 20.0;
/// Steps per host frame; time beyond `MAX_STEP_MS * MAX_SUBSTEPS` is dropped
pub const MAX_SUBSTEPS: u32 = 8;

#[derive(Debug, Clone)]
pub struct Session {
    pub world: World,
    paused: bool,
    /// Accumulated unpaused time
    game_time_ms: f64,
    prev_frame_ms: Option<f64>,
}

impl Session {
    /// Starts paused; call [`Session::resume`] once the player has control.
    pub fn new(world: World) -> Self {
        Self {
            world,
            paused: true,
            game_time_ms: 0.0,
            prev_frame_ms: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn game_time_ms(&self) -> f64 {
        self.game_time_ms
    }

    pub fn phase(&self) -> GamePhase {
        if self.world.game.game_over {
            GamePhase::GameOver
        } else if self.paused {
            GamePhase::Paused
        } else {
            GamePhase::Playing
        }
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::debug!("Paused at {:.0} ms game time", self.game_time_ms);
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.prev_frame_ms = None;
            self.world.reset_clocks();
            log::debug!("Resumed at {:.0} ms game time", self.game_time_ms);
        }
    }

    /// Advance by one host frame. Returns `None` while paused.
    ///
    /// Long frames are split into substeps of at most [`MAX_STEP_MS`] and
    /// their reports merged.
    pub fn frame(&mut self, raw_ms: f64, input: &TickInput) -> Option<FrameReport> {
        if self.paused {
            return None;
        }
        let mut delta = self
            .prev_frame_ms
            .map_or(0.0, |prev| (raw_ms - prev).max(0.0));
        self.prev_frame_ms = Some(raw_ms);

        let budget = MAX_STEP_MS * f64::from(MAX_SUBSTEPS);
        if delta > budget {
            log::debug!("Frame of {delta:.0} ms clamped to {budget:.0} ms");
            delta = budget;
        }

        let steps = ((delta / MAX_STEP_MS).ceil() as u32).max(1);
        let step_ms = delta / f64::from(steps);
        let mut report: Option<FrameReport> = None;
        for _ in 0..steps {
            self.game_time_ms += step_ms;
            let next = tick(&mut self.world, input, self.game_time_ms);
            report = Some(match report {
                Some(earlier) => earlier.merge(next),
                None => next,
            });
        }
        report
    }
}
