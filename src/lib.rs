//! Freefall - an endless falling-shaft arena game
//!
//! Core modules:
//! - `sim`: Simulation core (platform field, ceiling, body physics, health)
//! - `tuning`: Data-driven game balance
//! - `error`: Construction-time configuration errors
//!
//! Rendering, input capture and HUD live outside this crate; they feed
//! [`sim::TickInput`] in and read [`sim::FrameReport`] out.

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::Tuning;

use glam::{DVec2, DVec3};

/// Game configuration constants
pub mod consts {
    /// Milliseconds per second (frame timestamps are in ms)
    pub const MS_PER_SECOND: f64 = 1000.0;

    /// Shaft dimensions
    pub const PLAY_AREA_RADIUS: f64 = 60.0;

    /// Platform defaults
    pub const PLATFORM_SIZE: f64 = 6.0;
    pub const PLATFORM_THICKNESS: f64 = 1.0;

    /// Player footprint side length (corner rays sit at ±BODY_SIZE/2)
    pub const BODY_SIZE: f64 = 2.0;
    /// Max vertical distance to a warp target
    pub const WARPABLE_DIST: f64 = 20.0;

    /// Fall depth that starts to hurt (five "storeys" of 8.29)
    pub const FALL_DAMAGE_THRESHOLD: f64 = 5.0 * 8.29;
}

/// Project a 3D point onto the horizontal plane
#[inline]
pub fn xz(v: DVec3) -> DVec2 {
    DVec2::new(v.x, v.z)
}

/// Horizontal facing derived from an aim direction.
///
/// Looking straight up or down has no horizontal part; fall back to -Z.
#[inline]
pub fn horizontal_forward(aim: DVec3) -> DVec3 {
    let flat = DVec3::new(aim.x, 0.0, aim.z);
    let forward = flat.normalize_or_zero();
    if forward == DVec3::ZERO {
        DVec3::NEG_Z
    } else {
        forward
    }
}
