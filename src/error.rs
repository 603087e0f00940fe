//! Configuration errors raised while constructing the quality gate.
//!
//! Scoring itself never fails; these only surface when weights, thresholds
//! or rule tables are malformed.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("quality weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },

    #[error("weight for {metric} must be a finite non-negative number, got {value}")]
    NegativeWeight { metric: String, value: f64 },

    #[error("quality threshold must be within [0.0, 1.0], got {0}")]
    InvalidThreshold(f64),

    #[error("numeric range for {category}.{field} is invalid: [{min}, {max}]")]
    InvalidRange {
        category: String,
        field: String,
        min: f64,
        max: f64,
    },

    #[error("length bounds for {category}.{field} are invalid: min {min} exceeds max {max}")]
    InvalidLengthBounds {
        category: String,
        field: String,
        min: usize,
        max: usize,
    },

    #[error("allowed values for {category}.{field} must not be empty")]
    EmptyAllowedValues { category: String, field: String },

    #[error("invalid tuning value {name}: {reason}")]
    InvalidTuning { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
