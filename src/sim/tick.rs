//! Per-frame simulation step
//!
//! One call to [`tick`] advances every subsystem in a fixed order: ceiling,
//! platform field, body, then health and score. Everything is driven by the
//! caller's timestamp and the world's seeded RNG, so the same seed and input
//! script reproduce the same run.

use glam::DVec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boundary::Boundary;
use super::field::{PlatformField, PlatformId};
use super::player::{BodyPhase, PlayerBody};
use super::state::{GameEvent, GameState, HealthInputs, fall_danger};
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Jump fires on press, not while held
    pub jump: bool,
    /// Warp toward the aimed-at platform
    pub warp: bool,
    /// Look direction (need not be normalized)
    pub aim: DVec3,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            jump: false,
            warp: false,
            aim: DVec3::NEG_Z,
        }
    }
}

/// Snapshot handed to presentation after each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub position: DVec3,
    pub velocity: DVec3,
    pub health: f64,
    pub score: u64,
    /// Points earned this frame
    pub score_delta: u64,
    pub game_over: bool,
    /// Gap between the ceiling and the top of the player's head
    pub boundary_distance: f64,
    /// Drop recorded by this frame's landing (0 if none)
    pub fall_distance: f64,
    /// 0 when safe, 1 when the current fall is at its most dangerous
    pub fall_danger: f64,
    pub highlighted: Option<PlatformId>,
    pub phase: BodyPhase,
    pub events: Vec<GameEvent>,
}

impl FrameReport {
    /// Fold a later substep's report into this one
    pub fn merge(mut self, later: FrameReport) -> FrameReport {
        let mut events = std::mem::take(&mut self.events);
        events.extend(later.events);
        FrameReport {
            score_delta: self.score_delta + later.score_delta,
            fall_distance: self.fall_distance.max(later.fall_distance),
            events,
            ..later
        }
    }
}

/// Everything one run owns
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    pub seed: u64,
    pub rng: Pcg32,
    pub field: PlatformField,
    pub boundary: Boundary,
    pub body: PlayerBody,
    pub game: GameState,
    prev_timestamp: Option<f64>,
}

impl World {
    /// Fresh run. The body starts standing on the origin platform, which the
    /// field places on its first update.
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let start_y = tuning.field.platform_thickness / 2.0 + tuning.player.stand_height;
        log::info!("Starting run with seed {seed}");
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            field: PlatformField::new(tuning.field.clone()),
            boundary: Boundary::new(&tuning.boundary),
            body: PlayerBody::new(DVec3::new(0.0, start_y, 0.0)),
            game: GameState::new(),
            tuning,
            seed,
            prev_timestamp: None,
        })
    }

    /// Drop every stored timestamp so the next frame has no elapsed time
    pub fn reset_clocks(&mut self) {
        self.prev_timestamp = None;
        self.boundary.reset_clock();
        self.body.reset_clock();
    }

    fn report(&self, fall_distance: f64, score_delta: u64, events: Vec<GameEvent>) -> FrameReport {
        let body = &self.body;
        FrameReport {
            position: body.position,
            velocity: body.velocity,
            health: self.game.health,
            score: self.game.score,
            score_delta,
            game_over: self.game.game_over,
            boundary_distance: self
                .boundary
                .distance_to(body.position.y + self.tuning.player.head_height),
            fall_distance,
            fall_danger: fall_danger(body.landed_height, body.position.y, &self.tuning.health),
            highlighted: body.highlighted_platform,
            phase: body.phase(),
            events,
        }
    }
}

/// Advance the world to `t_ms`
pub fn tick(world: &mut World, input: &TickInput, t_ms: f64) -> FrameReport {
    if world.game.game_over {
        return world.report(0.0, 0, Vec::new());
    }

    let prev = *world.prev_timestamp.get_or_insert(t_ms);
    let elapsed_ms = (t_ms - prev).max(0.0);
    world.prev_timestamp = Some(t_ms);

    let mut events = Vec::new();
    let score_before = world.game.score;

    world.boundary.update(t_ms, world.body.position.y);
    world
        .field
        .update(&mut world.rng, world.boundary.y, world.body.position.y);

    let step = world.body.update(
        t_ms,
        input,
        &mut world.field,
        &world.boundary,
        &world.tuning.player,
    );

    if let Some(platform) = step.warp_started {
        events.push(GameEvent::WarpStarted { platform });
    }
    if let Some(landing) = step.landing {
        events.push(GameEvent::Landed {
            fall_distance: landing.fall_distance,
            warped: landing.warped,
        });
        if let Some(platform) = landing.health_consumed {
            events.push(GameEvent::HealthConsumed { platform });
        }
    }

    let fall_distance = world.body.fall_distance;
    if elapsed_ms > 0.0 {
        let inputs = HealthInputs {
            fall_distance,
            landed: world.body.landed,
            position_y: world.body.position.y,
            landed_height: world.body.landed_height,
            head_height: world.tuning.player.head_height,
            boundary_y: world.boundary.y,
            health_consumed: step.landing.is_some_and(|l| l.health_consumed.is_some()),
            just_warped: world.body.just_warped,
        };
        world
            .game
            .apply_frame(&inputs, &world.tuning.health, &mut events);
    }
    // Scored once; later frames must not see it again
    world.body.fall_distance = 0.0;

    if world.game.game_over {
        world.body.dead = true;
    }

    let score_delta = world.game.score - score_before;
    world.report(fall_distance, score_delta, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field::PlatformKind;

    const FRAME_MS: f64 = 16.0;

    fn run(world: &mut World, frames: usize, start_ms: f64) -> (f64, Vec<FrameReport>) {
        let mut t = start_ms;
        let reports = (0..frames)
            .map(|_| {
                let report = tick(world, &TickInput::default(), t);
                t += FRAME_MS;
                report
            })
            .collect();
        (t, reports)
    }

    #[test]
    fn test_new_rejects_invalid_tuning() {
        let mut tuning = Tuning::default();
        tuning.player.gravity = -1.0;
        assert!(World::new(tuning, 1).is_err());

        let mut tuning = Tuning::default();
        tuning.field.fallback_radius = f64::INFINITY;
        assert!(matches!(
            World::new(tuning, 1),
            Err(ConfigError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_first_tick_seeds_field_and_stands_on_origin() {
        let mut world = World::new(Tuning::default(), 7).unwrap();
        let (_, reports) = run(&mut world, 30, 0.0);
        assert!(world.field.is_initialized());
        assert!(world.field.platforms().len() >= world.tuning.field.initial_platforms);
        let last = reports.last().unwrap();
        assert!((last.position.y - 3.5).abs() < 1e-9);
        assert_eq!(last.phase, BodyPhase::Landed);
        assert_eq!(last.health, 1.0);
        assert!(!last.game_over);
    }

    #[test]
    fn test_repeated_timestamp_changes_nothing() {
        let mut world = World::new(Tuning::default(), 7).unwrap();
        let (t, _) = run(&mut world, 5, 0.0);
        let last_t = t - FRAME_MS;
        world.body.landed = false;
        world.body.position.y += 10.0;
        let before = (world.body.position, world.body.velocity, world.game.health);
        let report = tick(&mut world, &TickInput::default(), last_t);
        assert_eq!((report.position, report.velocity, report.health), before);
    }

    #[test]
    fn test_landing_reports_fall_once() {
        let mut world = World::new(Tuning::default(), 3).unwrap();
        let (t, _) = run(&mut world, 3, 0.0);
        let below = DVec3::new(200.0, -20.0, 0.0);
        world.field.register(below, PlatformKind::Normal);
        world.body.position = DVec3::new(200.0, 3.5, 0.0);
        world.body.landed = false;

        let mut t = t;
        let landing_report = (0..300)
            .map(|_| {
                let r = tick(&mut world, &TickInput::default(), t);
                t += FRAME_MS;
                r
            })
            .find(|r| r.fall_distance > 0.0)
            .unwrap();
        assert!((landing_report.fall_distance - 20.0).abs() < 1e-9);
        assert_eq!(landing_report.score_delta, 7);
        assert!(
            landing_report
                .events
                .contains(&GameEvent::ScoreGained { points: 7 })
        );

        let next = tick(&mut world, &TickInput::default(), t);
        assert_eq!(next.fall_distance, 0.0);
        assert_eq!(next.score_delta, 0);
        assert_eq!(next.score, 7);
    }

    #[test]
    fn test_game_over_freezes_world() {
        let mut world = World::new(Tuning::default(), 5).unwrap();
        let (t, _) = run(&mut world, 3, 0.0);
        // Drop the ceiling onto the player's head
        world.boundary.y = world.body.position.y + 1.0;
        let report = tick(&mut world, &TickInput::default(), t);
        assert!(report.game_over);
        assert_eq!(report.health, 0.0);
        assert!(report.events.contains(&GameEvent::GameOver));
        assert_eq!(report.phase, BodyPhase::Dead);

        let frozen = (world.body.position, world.boundary.y, world.field.platforms().len());
        let (_, reports) = run(&mut world, 20, t + FRAME_MS);
        assert!(reports.iter().all(|r| r.game_over && r.events.is_empty()));
        assert_eq!(
            (world.body.position, world.boundary.y, world.field.platforms().len()),
            frozen
        );
    }

    #[test]
    fn test_same_seed_same_field() {
        let mut a = World::new(Tuning::default(), 99).unwrap();
        let mut b = World::new(Tuning::default(), 99).unwrap();
        run(&mut a, 10, 0.0);
        run(&mut b, 10, 0.0);
        let pos = |w: &World| w.field.platforms().iter().map(|p| p.position).collect::<Vec<_>>();
        assert_eq!(pos(&a), pos(&b));
    }
}
