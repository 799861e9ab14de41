//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Caller-supplied timestamps only
//! - Seeded RNG only
//! - Stable iteration order (platforms in spawn order)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod boundary;
pub mod collision;
pub mod field;
pub mod player;
pub mod session;
pub mod state;
pub mod tick;
pub mod tween;

pub use aabb::{Aabb, Ray};
pub use boundary::Boundary;
pub use collision::{Collider, HitTarget, RayHit, cast_probe, cast_ray, crossing_count, point_is_free};
pub use field::{Platform, PlatformField, PlatformId, PlatformKind, SpawnOutcome, SpawnRequest};
pub use player::{BodyPhase, BodyStep, Landing, PlayerBody, Warp};
pub use session::Session;
pub use state::{GameEvent, GamePhase, GameState, HealthInputs, fall_damage, fall_danger};
pub use tick::{FrameReport, TickInput, World, tick};
pub use tween::{Easing, Tween};
