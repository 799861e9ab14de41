//! Construction-time errors
//!
//! The simulation never fails at runtime; bad tuning is rejected before a
//! world exists.

use thiserror::Error;

/// Tuning values that cannot produce a playable world.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be finite (got {value})")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} must be positive (got {value})")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} range is inverted: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{name} must be a probability in [0, 1] (got {value})")]
    BadProbability { name: &'static str, value: f64 },
    #[error("warpable + health probabilities exceed 1 ({total})")]
    KindProbabilitiesExceedOne { total: f64 },
    #[error("spawn dead zone {dead_zone} must be smaller than spawn radius {radius}")]
    DeadZoneCoversSpawnArea { dead_zone: f64, radius: f64 },
    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },
    #[error("invalid tuning document: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
