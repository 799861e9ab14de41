//! The descending ceiling
//!
//! Speed grows with the square root of elapsed game time and with the gap to
//! the player, so falling far ahead only buys a short reprieve.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::collision::{Collider, HitTarget};
use crate::tuning::BoundaryTuning;

/// Vertical thickness of the ceiling's solid slab (its surface is the bottom face)
pub const BOUNDARY_THICKNESS: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    /// Height of the ceiling surface; never increases
    pub y: f64,
    pub base_speed: f64,
    pub time_factor: f64,
    pub distance_factor: f64,
    pub time_scale_ms: f64,
    pub radius: f64,
    /// Speed computed on the last update (units per time unit)
    pub speed: f64,
    /// `y - player_y` as of the last update
    pub distance: f64,
    prev_timestamp: Option<f64>,
}

impl Boundary {
    pub fn new(tuning: &BoundaryTuning) -> Self {
        Self {
            y: tuning.start_y,
            base_speed: tuning.base_speed,
            time_factor: tuning.time_factor,
            distance_factor: tuning.distance_factor,
            time_scale_ms: tuning.time_scale_ms,
            radius: tuning.radius,
            speed: 0.0,
            distance: 0.0,
            prev_timestamp: None,
        }
    }

    /// `base + time_factor * sqrt(t) + distance_factor * distance`
    pub fn speed_for(&self, t_ms: f64, distance: f64) -> f64 {
        self.base_speed + self.time_factor * t_ms.max(0.0).sqrt() + self.distance_factor * distance
    }

    /// Move toward the player. The first call after construction or
    /// [`Boundary::reset_clock`] only records the timestamp.
    pub fn update(&mut self, t_ms: f64, player_y: f64) {
        let prev = *self.prev_timestamp.get_or_insert(t_ms);
        let elapsed = ((t_ms - prev) / self.time_scale_ms).max(0.0);

        self.distance = self.y - player_y;
        self.speed = self.speed_for(t_ms, self.distance);
        // A player above the ceiling would make speed negative; never rise
        self.y -= (self.speed * elapsed).max(0.0);
        self.prev_timestamp = Some(t_ms);
    }

    /// Forget the last timestamp (after a pause)
    pub fn reset_clock(&mut self) {
        self.prev_timestamp = None;
    }

    /// Gap between the ceiling surface and a height
    #[inline]
    pub fn distance_to(&self, y: f64) -> f64 {
        self.y - y
    }

    /// Solid slab for ray queries
    pub fn collider(&self) -> Collider {
        Collider {
            aabb: Aabb::new(
                DVec3::new(-self.radius, self.y, -self.radius),
                DVec3::new(self.radius, self.y + BOUNDARY_THICKNESS, self.radius),
            ),
            target: HitTarget::Boundary,
        }
    }
}
