//! Player body physics and collision response
//!
//! The body is a point (the eye) with a square footprint. Standing is
//! resolved by probing downward with five parallel rays and snapping the
//! body to `stand_height` above whatever they hit; the same pattern pointed
//! up makes overhangs and the ceiling bounce the body back down.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::aabb::Ray;
use super::boundary::Boundary;
use super::collision::{Collider, HitTarget, cast_probe, cast_ray};
use super::field::{PlatformField, PlatformId, PlatformKind};
use super::tick::TickInput;
use super::tween::{Easing, Tween};
use crate::consts::MS_PER_SECOND;
use crate::horizontal_forward;
use crate::tuning::PlayerTuning;

/// Movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyPhase {
    Airborne,
    Landed,
    /// Mid-warp toward a platform
    Warping,
    /// Terminal
    Dead,
}

/// A warp in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Warp {
    pub target: PlatformId,
    pub tween: Tween,
}

/// A landing transition this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Drop since the previous landing (0 for warp arrivals)
    pub fall_distance: f64,
    /// What was landed on
    pub surface: HitTarget,
    /// Health platform consumed by this landing
    pub health_consumed: Option<PlatformId>,
    /// Landing was the end of a warp
    pub warped: bool,
}

/// What happened to the body during one update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyStep {
    pub landing: Option<Landing>,
    pub warp_started: Option<PlatformId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    pub position: DVec3,
    pub velocity: DVec3,
    pub landed: bool,
    /// Height of the last landing (None before the first contact)
    pub landed_height: Option<f64>,
    /// Drop recorded by this frame's landing; zeroed after scoring reads it
    pub fall_distance: f64,
    /// The most recent landing was a warp arrival
    pub just_warped: bool,
    /// Warpable platform under the crosshair and within reach
    pub highlighted_platform: Option<PlatformId>,
    pub dead: bool,
    warp: Option<Warp>,
    /// Jump re-arms only after the button is released
    jump_held: bool,
    prev_timestamp: Option<f64>,
}

impl PlayerBody {
    /// A body resting at `position`
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            landed: true,
            landed_height: None,
            fall_distance: 0.0,
            just_warped: false,
            highlighted_platform: None,
            dead: false,
            warp: None,
            jump_held: false,
            prev_timestamp: None,
        }
    }

    pub fn phase(&self) -> BodyPhase {
        if self.dead {
            BodyPhase::Dead
        } else if self.warp.is_some() {
            BodyPhase::Warping
        } else if self.landed {
            BodyPhase::Landed
        } else {
            BodyPhase::Airborne
        }
    }

    pub fn is_warping(&self) -> bool {
        self.warp.is_some()
    }

    pub fn warp(&self) -> Option<&Warp> {
        self.warp.as_ref()
    }

    /// Forget the last timestamp (after a pause)
    pub fn reset_clock(&mut self) {
        self.prev_timestamp = None;
    }

    /// Advance the body to `t_ms`.
    ///
    /// A frame with no elapsed time changes neither position nor velocity.
    pub fn update(
        &mut self,
        t_ms: f64,
        input: &TickInput,
        field: &mut PlatformField,
        boundary: &Boundary,
        tuning: &PlayerTuning,
    ) -> BodyStep {
        let mut step = BodyStep::default();
        if self.dead {
            return step;
        }

        let prev = *self.prev_timestamp.get_or_insert(t_ms);
        let dt_ms = (t_ms - prev).max(0.0);
        self.prev_timestamp = Some(t_ms);

        self.update_highlight(input.aim, field, tuning);

        if dt_ms == 0.0 {
            return step;
        }

        if self.warp.is_some() {
            step.landing = self.advance_warp(dt_ms, field, tuning);
            return step;
        }

        let dt = dt_ms / MS_PER_SECOND;

        // Horizontal damping
        self.velocity.x -= self.velocity.x * tuning.damping * dt;
        self.velocity.z -= self.velocity.z * tuning.damping * dt;

        // Movement intent, relative to where the player is looking
        let intent = DVec3::new(
            axis(input.right, input.left),
            0.0,
            axis(input.forward, input.backward),
        )
        .normalize_or_zero();
        let forward = horizontal_forward(input.aim);
        let right = forward.cross(DVec3::Y);
        self.velocity += (forward * intent.z + right * intent.x) * tuning.move_accel * dt;

        if input.jump && !self.jump_held && self.landed {
            self.velocity.y += tuning.jump_velocity;
            self.landed = false;
        }
        self.jump_held = input.jump;

        self.velocity.y -= tuning.gravity * dt;

        let colliders: Vec<Collider> = field
            .colliders()
            .chain(std::iter::once(boundary.collider()))
            .collect();

        // Downward: stand on whatever the probe finds
        let below = cast_probe(
            self.position,
            DVec3::NEG_Y,
            tuning.down_probe,
            tuning.body_size,
            &colliders,
        );
        match below {
            Some(hit) if self.velocity.y < 0.0 => {
                self.position.y += tuning.stand_height - hit.distance;
                self.velocity.y = 0.0;
                let landed_height = *self.landed_height.get_or_insert(self.position.y);
                if !self.landed {
                    step.landing = Some(self.land(landed_height, hit.target, field, tuning));
                }
            }
            Some(_) => {}
            None => self.landed = false,
        }

        // Upward: bounce off anything overhead
        let above = cast_probe(
            self.position,
            DVec3::Y,
            tuning.up_probe,
            tuning.body_size,
            &colliders,
        );
        if above.is_some() && self.velocity.y > 0.0 {
            self.velocity.y = -self.velocity.y;
        }

        self.position += self.velocity * dt;

        if input.warp {
            step.warp_started = self.try_warp(input.aim, field, tuning);
        }

        step
    }

    /// Airborne -> Landed bookkeeping
    fn land(
        &mut self,
        previous_height: f64,
        surface: HitTarget,
        field: &mut PlatformField,
        tuning: &PlayerTuning,
    ) -> Landing {
        self.fall_distance = (previous_height - self.position.y).max(0.0);
        self.landed_height = Some(self.position.y);
        self.landed = true;
        self.just_warped = false;

        let health_consumed = match surface {
            HitTarget::Platform(id) if field.consume_health(id) => Some(id),
            _ => None,
        };
        field.mark_warpables_in_range(self.position, tuning.warpable_dist);

        log::trace!(
            "Landed at y={:.2} after falling {:.2}",
            self.position.y,
            self.fall_distance
        );
        Landing {
            fall_distance: self.fall_distance,
            surface,
            health_consumed,
            warped: false,
        }
    }

    /// Warpable platform the aim ray hits within reach, if any
    fn warp_target(
        &self,
        aim: DVec3,
        field: &PlatformField,
        tuning: &PlayerTuning,
    ) -> Option<(PlatformId, DVec3)> {
        let dir = aim.normalize_or_zero();
        if dir == DVec3::ZERO {
            return None;
        }
        let colliders: Vec<Collider> = field.colliders().collect();
        let hit = cast_ray(&Ray::unbounded(self.position, dir), &colliders)?;
        let HitTarget::Platform(id) = hit.target else {
            return None;
        };
        let platform = field.get(id)?;
        let reachable = platform.kind == PlatformKind::Warpable
            && (self.position.y - platform.position.y).abs() < tuning.warpable_dist;
        reachable.then_some((id, platform.position))
    }

    fn update_highlight(&mut self, aim: DVec3, field: &PlatformField, tuning: &PlayerTuning) {
        self.highlighted_platform = self.warp_target(aim, field, tuning).map(|(id, _)| id);
    }

    /// Start a warp toward the aimed-at platform. Only allowed while landed.
    pub fn try_warp(
        &mut self,
        aim: DVec3,
        field: &PlatformField,
        tuning: &PlayerTuning,
    ) -> Option<PlatformId> {
        if !self.landed || self.warp.is_some() || self.dead {
            return None;
        }
        let (target, center) = self.warp_target(aim, field, tuning)?;
        let end = center + DVec3::new(0.0, tuning.warp_lift, 0.0);
        self.warp = Some(Warp {
            target,
            tween: Tween::new(
                self.position,
                end,
                tuning.warp_duration_ms,
                Easing::QuadraticOut,
            ),
        });
        self.velocity = DVec3::ZERO;
        log::debug!("Warp started toward platform {:?}", target);
        Some(target)
    }

    /// Move along the warp tween; lands on completion
    fn advance_warp(
        &mut self,
        dt_ms: f64,
        field: &mut PlatformField,
        tuning: &PlayerTuning,
    ) -> Option<Landing> {
        let warp = self.warp.as_mut()?;
        self.position = warp.tween.advance(dt_ms);
        self.velocity = DVec3::ZERO;
        if !warp.tween.is_finished() {
            return None;
        }

        let target = warp.target;
        self.warp = None;
        self.landed = true;
        self.landed_height = Some(self.position.y);
        self.fall_distance = 0.0;
        self.just_warped = true;
        field.mark_warpables_in_range(self.position, tuning.warpable_dist);

        Some(Landing {
            fall_distance: 0.0,
            surface: HitTarget::Platform(target),
            health_consumed: None,
            warped: true,
        })
    }
}

#[inline]
fn axis(positive: bool, negative: bool) -> f64 {
    f64::from(u8::from(positive)) - f64::from(u8::from(negative))
}
