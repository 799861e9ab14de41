//! Incremental interpolation for short scripted motions (warp)
//!
//! A tween is plain state advanced once per tick; nothing runs on its own.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Easing curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    /// Decelerating quadratic: `t * (2 - t)`
    #[default]
    QuadraticOut,
}

impl Easing {
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticOut => t * (2.0 - t),
        }
    }
}

/// Position tween from `start` to `end` over `duration_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub start: DVec3,
    pub end: DVec3,
    pub elapsed_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(start: DVec3, end: DVec3, duration_ms: f64, easing: Easing) -> Self {
        Self {
            start,
            end,
            elapsed_ms: 0.0,
            duration_ms,
            easing,
        }
    }

    /// Normalized progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).min(1.0)
        }
    }

    pub fn value(&self) -> DVec3 {
        self.start.lerp(self.end, self.easing.apply(self.progress()))
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Step forward and return the new position
    pub fn advance(&mut self, dt_ms: f64) -> DVec3 {
        self.elapsed_ms += dt_ms.max(0.0);
        self.value()
    }
}
