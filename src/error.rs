//! Construction-time configuration errors
//!
//! Everything that can go wrong before a session starts lands here. Once a
//! session is running, the state machine never fails.

use thiserror::Error;

use crate::quiz::Tier;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{which} bound {value:?} is not a number")]
    BoundNotNumeric { which: &'static str, value: String },
    #[error("{which} bound must be finite, got {value}")]
    BoundNotFinite { which: &'static str, value: f64 },
    #[error("{which} bound {value} exceeds the allowed magnitude {limit}")]
    BoundTooLarge {
        which: &'static str,
        value: f64,
        limit: f64,
    },
    #[error("empty domain: xmin ({xmin}) must be less than xmax ({xmax})")]
    EmptyDomain { xmin: f64, xmax: f64 },
    #[error("domain [{xmin}, {xmax}] is narrower than the minimum width {min_width}")]
    DomainTooNarrow { xmin: f64, xmax: f64, min_width: f64 },
    #[error("unknown difficulty level {0} (expected 1-5)")]
    UnknownTier(u8),
    #[error("{tier} pool has {available} questions, {required} needed")]
    PoolTooSmall {
        tier: Tier,
        available: usize,
        required: usize,
    },
    #[error("invalid question {prompt:?}: {reason}")]
    InvalidQuestion { prompt: String, reason: String },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
