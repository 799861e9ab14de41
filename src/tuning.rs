//! Data-driven game balance
//!
//! Every constant the simulation reads lives here so a run can be reshaped
//! from a JSON document without recompiling. Sections deserialize with
//! `#[serde(default)]`, so a document only needs the keys it overrides.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Shape of the horizontal region platforms may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayAreaShape {
    /// Disc of `play_area_radius` around the shaft axis
    #[default]
    Circle,
    /// Square with half-side `play_area_radius`
    Square,
}

/// Platform generator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTuning {
    pub play_area_radius: f64,
    pub play_area_shape: PlayAreaShape,
    /// Side length of a platform's standing surface
    pub platform_size: f64,
    pub platform_thickness: f64,
    /// Horizontal padding added on every side of the occupancy volume
    pub occupancy_margin_xz: f64,
    /// Vertical padding added above and below the occupancy volume
    pub occupancy_margin_y: f64,
    pub min_spawn_dist_xz: f64,
    pub max_spawn_dist_xz: f64,
    pub min_spawn_dist_down: f64,
    pub max_spawn_dist_down: f64,
    /// Deepest drop still considered "safe"; usually the fall damage threshold
    pub height_damage_threshold: f64,
    /// Chance a batch slot picks the deep (damaging) drop range
    pub risky_drop_probability: f64,
    pub warpable_probability: f64,
    pub health_probability: f64,
    pub max_retries: u32,
    /// Horizontal radius for the near-center fallback spawn
    pub fallback_radius: f64,
    pub initial_platforms: usize,
    /// Vertical band `(min, max)` the initial cluster is scattered in
    pub initial_band_y: (f64, f64),
    pub initial_spawn_until_y: f64,
    pub spawn_interval_y: f64,
    /// How far above the boundary a collapsing platform travels before removal
    pub prune_margin: f64,
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self {
            play_area_radius: PLAY_AREA_RADIUS,
            play_area_shape: PlayAreaShape::Circle,
            platform_size: PLATFORM_SIZE,
            platform_thickness: PLATFORM_THICKNESS,
            occupancy_margin_xz: 6.0,
            occupancy_margin_y: 5.5,
            min_spawn_dist_xz: 6.0,
            max_spawn_dist_xz: 24.0,
            min_spawn_dist_down: 6.0,
            max_spawn_dist_down: 70.0,
            height_damage_threshold: FALL_DAMAGE_THRESHOLD,
            risky_drop_probability: 0.25,
            warpable_probability: 0.15,
            health_probability: 0.1,
            max_retries: 5,
            fallback_radius: PLAY_AREA_RADIUS / 2.0,
            initial_platforms: 8,
            initial_band_y: (-30.0, 10.0),
            initial_spawn_until_y: -200.0,
            spawn_interval_y: 200.0,
            prune_margin: 10.0,
        }
    }
}

/// Descending ceiling tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryTuning {
    pub start_y: f64,
    pub base_speed: f64,
    pub time_factor: f64,
    pub distance_factor: f64,
    /// Milliseconds per boundary time unit
    pub time_scale_ms: f64,
    /// Horizontal half-extent of the ceiling surface
    pub radius: f64,
}

impl Default for BoundaryTuning {
    fn default() -> Self {
        Self {
            start_y: 50.0,
            base_speed: 0.0001,
            time_factor: 0.0002,
            distance_factor: 0.001,
            time_scale_ms: 5000.0,
            radius: 140.0,
        }
    }
}

/// Player body physics tuning (units per second)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub body_size: f64,
    /// Rest height of the body origin above the surface it stands on
    pub stand_height: f64,
    pub down_probe: f64,
    pub up_probe: f64,
    pub damping: f64,
    pub move_accel: f64,
    pub gravity: f64,
    pub jump_velocity: f64,
    /// Offset from body origin to the top of the head
    pub head_height: f64,
    pub warpable_dist: f64,
    /// Height above the target platform a warp ends at
    pub warp_lift: f64,
    pub warp_duration_ms: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            body_size: BODY_SIZE,
            stand_height: 3.0,
            down_probe: 5.0,
            up_probe: 1.0,
            damping: 10.0,
            move_accel: 200.0,
            gravity: 98.0,
            jump_velocity: 40.0,
            head_height: 2.0,
            warpable_dist: WARPABLE_DIST,
            warp_lift: 3.5,
            warp_duration_ms: 100.0,
        }
    }
}

/// Health and score tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTuning {
    pub fall_damage_factor: f64,
    pub fall_damage_threshold: f64,
    /// Scaled fall depth at which the run ends before landing
    pub auto_loss_threshold: f64,
    pub health_bonus: f64,
    pub score_per_unit: f64,
    /// Fall depth past the threshold that maps to full danger
    pub danger_span: f64,
}

impl Default for HealthTuning {
    fn default() -> Self {
        Self {
            fall_damage_factor: 0.01,
            fall_damage_threshold: FALL_DAMAGE_THRESHOLD,
            auto_loss_threshold: 1.5,
            health_bonus: 0.3,
            score_per_unit: 1.75 / 5.0,
            danger_span: 150.0,
        }
    }
}

/// Complete simulation tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field: FieldTuning,
    pub boundary: BoundaryTuning,
    pub player: PlayerTuning,
    pub health: HealthTuning,
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from `FREEFALL_TUNING` (or `config/tuning.json`).
    /// Falls back to defaults if the file is missing or invalid.
    pub fn load() -> Self {
        let path = std::env::var("FREEFALL_TUNING")
            .unwrap_or_else(|_| "config/tuning.json".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_json(&content) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {path}");
                    tuning
                }
                Err(e) => {
                    log::warn!("Failed to load {path}: {e}, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Reject values no world can be built from
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.field;
        positive("play_area_radius", f.play_area_radius)?;
        positive("platform_size", f.platform_size)?;
        positive("platform_thickness", f.platform_thickness)?;
        non_negative("occupancy_margin_xz", f.occupancy_margin_xz)?;
        non_negative("occupancy_margin_y", f.occupancy_margin_y)?;
        non_negative("min_spawn_dist_xz", f.min_spawn_dist_xz)?;
        positive("max_spawn_dist_xz", f.max_spawn_dist_xz)?;
        if f.min_spawn_dist_xz >= f.max_spawn_dist_xz {
            return Err(ConfigError::DeadZoneCoversSpawnArea {
                dead_zone: f.min_spawn_dist_xz,
                radius: f.max_spawn_dist_xz,
            });
        }
        positive("min_spawn_dist_down", f.min_spawn_dist_down)?;
        ordered(
            "safe drop",
            f.min_spawn_dist_down,
            f.height_damage_threshold,
        )?;
        ordered(
            "risky drop",
            f.height_damage_threshold,
            f.max_spawn_dist_down,
        )?;
        probability("risky_drop_probability", f.risky_drop_probability)?;
        probability("warpable_probability", f.warpable_probability)?;
        probability("health_probability", f.health_probability)?;
        let total = f.warpable_probability + f.health_probability;
        if total > 1.0 {
            return Err(ConfigError::KindProbabilitiesExceedOne { total });
        }
        if f.max_retries == 0 {
            return Err(ConfigError::ZeroCount {
                name: "max_retries",
            });
        }
        if f.initial_platforms == 0 {
            return Err(ConfigError::ZeroCount {
                name: "initial_platforms",
            });
        }
        positive("fallback_radius", f.fallback_radius)?;
        ordered("initial_band_y", f.initial_band_y.0, f.initial_band_y.1)?;
        finite("initial_spawn_until_y", f.initial_spawn_until_y)?;
        positive("spawn_interval_y", f.spawn_interval_y)?;
        non_negative("prune_margin", f.prune_margin)?;

        let b = &self.boundary;
        finite("start_y", b.start_y)?;
        non_negative("base_speed", b.base_speed)?;
        non_negative("time_factor", b.time_factor)?;
        non_negative("distance_factor", b.distance_factor)?;
        positive("time_scale_ms", b.time_scale_ms)?;
        positive("boundary radius", b.radius)?;

        let p = &self.player;
        positive("body_size", p.body_size)?;
        positive("stand_height", p.stand_height)?;
        ordered("down_probe", p.stand_height, p.down_probe)?;
        positive("up_probe", p.up_probe)?;
        non_negative("damping", p.damping)?;
        non_negative("move_accel", p.move_accel)?;
        non_negative("gravity", p.gravity)?;
        non_negative("jump_velocity", p.jump_velocity)?;
        non_negative("head_height", p.head_height)?;
        positive("warpable_dist", p.warpable_dist)?;
        non_negative("warp_lift", p.warp_lift)?;
        positive("warp_duration_ms", p.warp_duration_ms)?;

        let h = &self.health;
        non_negative("fall_damage_factor", h.fall_damage_factor)?;
        non_negative("fall_damage_threshold", h.fall_damage_threshold)?;
        positive("auto_loss_threshold", h.auto_loss_threshold)?;
        non_negative("health_bonus", h.health_bonus)?;
        non_negative("score_per_unit", h.score_per_unit)?;
        positive("danger_span", h.danger_span)?;
        Ok(())
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn ordered(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    finite(name, min)?;
    finite(name, max)?;
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { name, min, max })
    }
}

fn probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::BadProbability { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_overrides_only_named_keys() {
        let tuning =
            Tuning::from_json(r#"{ "health": { "auto_loss_threshold": 1.0 } }"#).unwrap();
        assert_eq!(tuning.health.auto_loss_threshold, 1.0);
        assert_eq!(tuning.health.health_bonus, 0.3);
        assert_eq!(tuning.field.max_retries, 5);
    }

    #[test]
    fn test_infinite_values_rejected() {
        let mut tuning = Tuning::default();
        tuning.field.fallback_radius = f64::INFINITY;
        tuning.field.max_spawn_dist_xz = f64::INFINITY;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::NotFinite { name: "max_spawn_dist_xz", .. })
        ));

        let mut tuning = Tuning::default();
        tuning.field.initial_band_y = (f64::NEG_INFINITY, f64::INFINITY);
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::NotFinite { name: "initial_band_y", .. })
        ));

        let mut tuning = Tuning::default();
        tuning.boundary.start_y = f64::NAN;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::NotFinite { name: "start_y", .. })
        ));
    }

    #[test]
    fn test_negative_spawn_range_rejected() {
        let mut tuning = Tuning::default();
        tuning.field.min_spawn_dist_xz = -1.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::Negative { name: "min_spawn_dist_xz", .. })
        ));
    }

    #[test]
    fn test_inverted_drop_range_rejected() {
        let mut tuning = Tuning::default();
        tuning.field.max_spawn_dist_down = 10.0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::InvertedRange { name: "risky drop", .. })
        ));
    }

    #[test]
    fn test_kind_probabilities_capped() {
        let mut tuning = Tuning::default();
        tuning.field.warpable_probability = 0.7;
        tuning.field.health_probability = 0.5;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::KindProbabilitiesExceedOne { .. })
        ));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut tuning = Tuning::default();
        tuning.field.max_retries = 0;
        assert_eq!(
            tuning.validate(),
            Err(ConfigError::ZeroCount {
                name: "max_retries"
            })
        );
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
