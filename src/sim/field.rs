//! Procedural platform field
//!
//! Platforms are spawned in batches below a moving frontier. Each slot of a
//! batch drops a new platform somewhere below its parent, so every slot forms
//! a strictly descending chain. Candidate positions are rejection-sampled:
//! too close to the parent, outside the shaft, or inside another platform's
//! occupancy volume all trigger a retry.

use glam::{DVec2, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::collision::{Collider, HitTarget, point_is_free};
use crate::tuning::{FieldTuning, PlayAreaShape};
use crate::xz;

/// Stable platform identity (never reused within a session)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlatformId(pub u32);

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Normal,
    /// Can be warped to from a nearby landing
    Warpable,
    /// Restores health once, then turns Normal
    Health,
}

/// A platform entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    /// Center of the standing slab
    pub position: DVec3,
    pub kind: PlatformKind,
    /// Box the player stands on
    pub collision: Aabb,
    /// Enlarged box used only to reject overlapping spawns
    pub occupancy: Aabb,
    /// False once the ceiling has passed it (collapsing, no longer solid)
    pub active: bool,
    /// Warpable and within warp distance of the player's last landing
    pub in_warp_range: bool,
    /// Growth batch this platform was spawned in
    pub batch: u32,
}

impl Platform {
    /// Top surface height
    #[inline]
    pub fn top(&self) -> f64 {
        self.collision.max.y
    }
}

/// One rejection-sampled spawn attempt series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    /// Horizontal parent position (x, z)
    pub origin: DVec2,
    pub min_y: f64,
    pub max_y: f64,
    /// Half-side of the square dead zone around `origin`
    pub min_dist_xz: f64,
    /// Half-side of the square candidates are drawn from
    pub max_dist_xz: f64,
    pub kind: PlatformKind,
}

impl SpawnRequest {
    /// Same vertical target, drawn around the shaft axis instead of the parent
    pub fn near_center(&self, radius: f64) -> Self {
        Self {
            origin: DVec2::ZERO,
            min_dist_xz: 0.0,
            max_dist_xz: radius,
            ..*self
        }
    }
}

/// Result of [`PlatformField::spawn_platform`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnOutcome {
    Placed {
        id: PlatformId,
        position: DVec3,
        attempts: u32,
    },
    /// Every attempt failed; nothing was registered
    Rejected { attempts: u32 },
}

impl SpawnOutcome {
    pub fn position(&self) -> Option<DVec3> {
        match self {
            SpawnOutcome::Placed { position, .. } => Some(*position),
            SpawnOutcome::Rejected { .. } => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            SpawnOutcome::Placed { attempts, .. } | SpawnOutcome::Rejected { attempts } => {
                *attempts
            }
        }
    }
}

/// Owner of all live platforms and the spawn frontier
#[derive(Debug, Clone)]
pub struct PlatformField {
    tuning: FieldTuning,
    /// Spawn order
    platforms: Vec<Platform>,
    initialized: bool,
    /// Growth continues until some chain drops below this
    spawn_until_y: f64,
    /// Player must fall below this to trigger the next growth cycle
    spawn_more_trigger_y: f64,
    /// Chain heads of the latest batch (may be virtual anchors at gaps)
    frontier: Vec<DVec3>,
    batch: u32,
    next_id: u32,
}

impl PlatformField {
    /// The first growth cycle runs on the first update; the next one is
    /// armed half an interval above the floor it reached.
    pub fn new(tuning: FieldTuning) -> Self {
        let spawn_until_y = tuning.initial_spawn_until_y;
        let spawn_more_trigger_y = spawn_until_y + 1.5 * tuning.spawn_interval_y;
        Self {
            tuning,
            platforms: Vec::new(),
            initialized: false,
            spawn_until_y,
            spawn_more_trigger_y,
            frontier: Vec::new(),
            batch: 0,
            next_id: 1,
        }
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn spawn_until_y(&self) -> f64 {
        self.spawn_until_y
    }

    pub fn spawn_more_trigger_y(&self) -> f64 {
        self.spawn_more_trigger_y
    }

    pub fn current_batch(&self) -> u32 {
        self.batch
    }

    /// Chain heads of the most recent batch
    pub fn frontier(&self) -> &[DVec3] {
        &self.frontier
    }

    /// Lowest point content has been generated down to
    pub fn frontier_y(&self) -> f64 {
        self.frontier
            .iter()
            .map(|p| p.y)
            .fold(f64::INFINITY, f64::min)
    }

    /// Solid boxes of every active platform
    pub fn colliders(&self) -> impl Iterator<Item = Collider> + '_ {
        self.platforms.iter().filter(|p| p.active).map(|p| Collider {
            aabb: p.collision,
            target: HitTarget::Platform(p.id),
        })
    }

    /// Whether a horizontal point lies inside the shaft
    pub fn in_play_area(&self, point: DVec2) -> bool {
        let r = self.tuning.play_area_radius;
        match self.tuning.play_area_shape {
            PlayAreaShape::Circle => point.length() <= r,
            PlayAreaShape::Square => point.x.abs() <= r && point.y.abs() <= r,
        }
    }

    /// Rejection-sample a platform position and register it.
    ///
    /// Candidates are uniform in `[origin ± max_dist_xz] × [min_y, max_y]`.
    /// A candidate is rejected when it falls in the dead zone
    /// `[origin ± min_dist_xz]`, leaves the play area, or a downward ray from
    /// it crosses occupancy volumes an odd number of times.
    pub fn spawn_platform<R: Rng>(
        &mut self,
        rng: &mut R,
        request: &SpawnRequest,
    ) -> SpawnOutcome {
        let max_retries = self.tuning.max_retries;
        for attempt in 1..=max_retries {
            let candidate = sample_candidate(rng, request);
            if self.accepts(candidate, request) {
                let id = self.register(candidate, request.kind);
                return SpawnOutcome::Placed {
                    id,
                    position: candidate,
                    attempts: attempt,
                };
            }
        }
        SpawnOutcome::Rejected {
            attempts: max_retries,
        }
    }

    fn accepts(&self, candidate: DVec3, request: &SpawnRequest) -> bool {
        let offset = xz(candidate) - request.origin;
        let in_dead_zone =
            offset.x.abs() < request.min_dist_xz && offset.y.abs() < request.min_dist_xz;
        if in_dead_zone || !self.in_play_area(xz(candidate)) {
            return false;
        }
        point_is_free(candidate, self.platforms.iter().map(|p| &p.occupancy))
    }

    /// Add a platform at an exact position without any checks
    pub fn register(&mut self, position: DVec3, kind: PlatformKind) -> PlatformId {
        let id = PlatformId(self.next_id);
        self.next_id += 1;

        let t = &self.tuning;
        let half = DVec3::new(
            t.platform_size / 2.0,
            t.platform_thickness / 2.0,
            t.platform_size / 2.0,
        );
        let collision = Aabb::from_center(position, half);
        let occupancy = collision.inflated(t.occupancy_margin_xz, t.occupancy_margin_y);

        self.platforms.push(Platform {
            id,
            position,
            kind,
            collision,
            occupancy,
            active: true,
            in_warp_range: false,
            batch: self.batch,
        });
        id
    }

    /// Single roll: Warpable, else Health, else Normal
    pub fn roll_kind<R: Rng>(&self, rng: &mut R) -> PlatformKind {
        let roll: f64 = rng.random();
        let warpable = self.tuning.warpable_probability;
        if roll < warpable {
            PlatformKind::Warpable
        } else if roll < warpable + self.tuning.health_probability {
            PlatformKind::Health
        } else {
            PlatformKind::Normal
        }
    }

    /// Advance the field for one frame: prune behind the ceiling, then grow
    /// ahead of the player if needed.
    pub fn update<R: Rng>(&mut self, rng: &mut R, boundary_y: f64, player_y: f64) {
        let pruned = self.prune(boundary_y);
        if pruned > 0 {
            log::debug!("Pruned {pruned} platforms above y={boundary_y:.1}");
        }

        let first_call = !self.initialized;
        if first_call {
            self.seed_initial(rng);
        }
        if first_call || player_y < self.spawn_more_trigger_y {
            self.grow(rng);
        }
    }

    /// Mark platforms the ceiling has passed as collapsing and drop those
    /// past the lag margin. The latest batch is never removed.
    /// Returns the number removed.
    pub fn prune(&mut self, boundary_y: f64) -> usize {
        for p in self.platforms.iter_mut() {
            if p.position.y > boundary_y {
                p.active = false;
            }
        }
        let limit = boundary_y + self.tuning.prune_margin;
        let latest = self.batch;
        let before = self.platforms.len();
        self.platforms
            .retain(|p| p.batch == latest || p.position.y <= limit);
        before - self.platforms.len()
    }

    /// One platform exactly at the origin, the rest scattered over the
    /// whole play area.
    fn seed_initial<R: Rng>(&mut self, rng: &mut R) {
        let origin = DVec3::ZERO;
        self.register(origin, PlatformKind::Normal);
        self.frontier.push(origin);

        let (min_y, max_y) = self.tuning.initial_band_y;
        for _ in 1..self.tuning.initial_platforms {
            let request = SpawnRequest {
                origin: DVec2::ZERO,
                min_y,
                max_y,
                min_dist_xz: 0.0,
                max_dist_xz: self.tuning.play_area_radius,
                kind: self.roll_kind(rng),
            };
            if let Some(position) = self.spawn_platform(rng, &request).position() {
                self.frontier.push(position);
            }
        }

        self.initialized = true;
        log::debug!("Seeded initial cluster of {} platforms", self.platforms.len());
    }

    /// Run batches until some chain drops below the floor, then move the
    /// floor and trigger down one interval.
    fn grow<R: Rng>(&mut self, rng: &mut R) {
        let start_len = self.platforms.len();
        let mut batches = 0;
        loop {
            self.grow_batch(rng);
            batches += 1;
            if self.frontier_y() < self.spawn_until_y {
                break;
            }
        }
        self.spawn_until_y -= self.tuning.spawn_interval_y;
        self.spawn_more_trigger_y -= self.tuning.spawn_interval_y;
        log::debug!(
            "Grew {} platforms in {} batches; frontier y={:.1}, next trigger y={:.1}",
            self.platforms.len() - start_len,
            batches,
            self.frontier_y(),
            self.spawn_more_trigger_y,
        );
    }

    /// Drop one new platform below every chain head
    fn grow_batch<R: Rng>(&mut self, rng: &mut R) {
        self.batch += 1;
        let anchors = std::mem::take(&mut self.frontier);
        let mut next = Vec::with_capacity(anchors.len());

        for anchor in anchors {
            let t = &self.tuning;
            let (drop_min, drop_max) = if rng.random_bool(t.risky_drop_probability) {
                (t.height_damage_threshold, t.max_spawn_dist_down)
            } else {
                (t.min_spawn_dist_down, t.height_damage_threshold)
            };
            let request = SpawnRequest {
                origin: xz(anchor),
                min_y: anchor.y - drop_max,
                max_y: anchor.y - drop_min,
                min_dist_xz: t.min_spawn_dist_xz,
                max_dist_xz: t.max_spawn_dist_xz,
                kind: self.roll_kind(rng),
            };
            let fallback = request.near_center(t.fallback_radius);

            let placed = self
                .spawn_platform(rng, &request)
                .position()
                .or_else(|| self.spawn_platform(rng, &fallback).position());

            match placed {
                Some(position) => next.push(position),
                None => {
                    // Keep the chain descending through the gap
                    let gap = DVec3::new(
                        anchor.x,
                        (request.min_y + request.max_y) / 2.0,
                        anchor.z,
                    );
                    log::warn!("Spawn and fallback rejected; leaving gap at y={:.1}", gap.y);
                    next.push(gap);
                }
            }
        }

        self.frontier = next;
    }

    /// Turn a Health platform Normal. Returns whether it was Health.
    pub fn consume_health(&mut self, id: PlatformId) -> bool {
        match self.platforms.iter_mut().find(|p| p.id == id) {
            Some(p) if p.kind == PlatformKind::Health => {
                p.kind = PlatformKind::Normal;
                true
            }
            _ => false,
        }
    }

    /// Flag warpable platforms within vertical reach of `from`
    pub fn mark_warpables_in_range(&mut self, from: DVec3, dist: f64) {
        for p in self.platforms.iter_mut() {
            p.in_warp_range =
                p.kind == PlatformKind::Warpable && (p.position.y - from.y).abs() < dist;
        }
    }
}

fn sample_candidate<R: Rng>(rng: &mut R, request: &SpawnRequest) -> DVec3 {
    let r = request.max_dist_xz;
    DVec3::new(
        request.origin.x + rng.random_range(-r..=r),
        rng.random_range(request.min_y..=request.max_y),
        request.origin.y + rng.random_range(-r..=r),
    )
}
