//! Game rules and tuning
//!
//! Loaded from an optional JSON file; every field falls back to the
//! compiled-in constant when omitted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Tunable game rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Track ===
    /// Samples taken along the track function
    pub sample_count: usize,
    /// Pixel margin around the drawn track
    pub track_margin: f32,

    // === Car ===
    /// Lower speed factor bound
    pub speed_min: f64,
    /// Upper speed factor bound
    pub speed_max: f64,
    /// Speed factor at session start
    pub speed_initial: f64,
    /// Speed change per answer or timeout
    pub speed_step: f64,
    /// Track samples advanced per second at speed factor 1.0
    pub speed_scale: f64,

    // === Quiz ===
    /// Seconds allowed per question
    pub question_time_limit: f64,
    /// Unanswered questions that end the run
    pub unanswered_limit: u32,
    /// Questions drawn per session
    pub questions_per_session: usize,
    /// Correct answers needed for a successful run
    pub success_threshold: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_count: SAMPLE_COUNT,
            track_margin: TRACK_MARGIN,

            speed_min: SPEED_MIN,
            speed_max: SPEED_MAX,
            speed_initial: SPEED_INITIAL,
            speed_step: SPEED_STEP,
            speed_scale: SPEED_SCALE,

            question_time_limit: QUESTION_TIME_LIMIT,
            unanswered_limit: UNANSWERED_LIMIT,
            questions_per_session: QUESTIONS_PER_SESSION,
            success_threshold: SUCCESS_THRESHOLD,
        }
    }
}

impl Settings {
    /// Check the rules are internally consistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::InvalidSettings(msg));

        if !(2..=MAX_SAMPLE_COUNT).contains(&self.sample_count) {
            return fail(format!(
                "sample_count must be in 2..={}, got {}",
                MAX_SAMPLE_COUNT, self.sample_count
            ));
        }
        if !self.track_margin.is_finite() || self.track_margin < 0.0 {
            return fail(format!("track_margin must be >= 0, got {}", self.track_margin));
        }
        let speeds = [
            self.speed_min,
            self.speed_max,
            self.speed_initial,
            self.speed_step,
            self.speed_scale,
        ];
        if speeds.iter().any(|s| !s.is_finite()) {
            return fail("speed values must be finite".to_string());
        }
        if self.speed_min <= 0.0 || self.speed_min > self.speed_max {
            return fail(format!(
                "speed bounds [{}, {}] are invalid",
                self.speed_min, self.speed_max
            ));
        }
        if !(self.speed_min..=self.speed_max).contains(&self.speed_initial) {
            return fail(format!(
                "speed_initial {} is outside [{}, {}]",
                self.speed_initial, self.speed_min, self.speed_max
            ));
        }
        if self.speed_step <= 0.0 || self.speed_scale <= 0.0 {
            return fail("speed_step and speed_scale must be positive".to_string());
        }
        if !self.question_time_limit.is_finite() || self.question_time_limit <= 0.0 {
            return fail(format!(
                "question_time_limit must be positive, got {}",
                self.question_time_limit
            ));
        }
        if self.unanswered_limit == 0 {
            return fail("unanswered_limit must be at least 1".to_string());
        }
        if self.questions_per_session == 0 {
            return fail("questions_per_session must be at least 1".to_string());
        }
        if self.success_threshold as usize > self.questions_per_session {
            return fail(format!(
                "success_threshold {} exceeds questions_per_session {}",
                self.success_threshold, self.questions_per_session
            ));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from a JSON file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp a speed factor into the configured bounds
    #[inline]
    pub fn clamp_speed(&self, speed: f64) -> f64 {
        speed.clamp(self.speed_min, self.speed_max)
    }
}
