//! Coaster Quiz - A roller-coaster math quiz game
//!
//! Core modules:
//! - `expr`: Expression language for user-supplied track functions
//! - `track`: Function sampling and world/screen mapping
//! - `quiz`: Question pools, tiers and per-session draws
//! - `levels`: Built-in level presets (one per tier)
//! - `sim`: Deterministic session state machine (tick, answers, timeouts)
//! - `settings`: Data-driven game rules

pub mod error;
pub mod expr;
pub mod levels;
pub mod quiz;
pub mod settings;
pub mod sim;
pub mod track;

pub use error::ConfigError;
pub use levels::LevelPreset;
pub use quiz::{Question, QuizBank, QuizSession, Tier};
pub use settings::Settings;
pub use sim::{Session, SessionEvent, SessionSummary};
pub use track::{Domain, ScreenRect, Track, TrackPoint};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the runner (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of samples taken along the track function
    pub const SAMPLE_COUNT: usize = 1000;
    /// Expression used when the player's function can't be parsed or evaluated
    pub const DEFAULT_EXPRESSION: &str = "10 - x**2";
    /// Largest accepted magnitude for a domain bound
    pub const MAX_DOMAIN_MAGNITUDE: f64 = 1.0e6;
    /// Smallest accepted domain width
    pub const MIN_DOMAIN_WIDTH: f64 = 1.0e-3;
    /// Upper bound on configurable sample counts
    pub const MAX_SAMPLE_COUNT: usize = 100_000;
    /// Screen margin around the drawn track (pixels)
    pub const TRACK_MARGIN: f32 = 40.0;

    /// Speed factor bounds
    pub const SPEED_MIN: f64 = 0.5;
    pub const SPEED_MAX: f64 = 5.0;
    /// Speed factor at session start
    pub const SPEED_INITIAL: f64 = 0.5;
    /// Speed change per answer/timeout
    pub const SPEED_STEP: f64 = 0.5;
    /// Track samples advanced per second at speed factor 1.0
    pub const SPEED_SCALE: f64 = 50.0;

    /// Seconds allowed per question
    pub const QUESTION_TIME_LIMIT: f64 = 5.0;
    /// Unanswered questions that end the run
    pub const UNANSWERED_LIMIT: u32 = 2;
    /// Questions drawn per session
    pub const QUESTIONS_PER_SESSION: usize = 5;
    /// Options per question
    pub const OPTION_COUNT: usize = 4;
    /// Correct answers needed for a successful run
    pub const SUCCESS_THRESHOLD: u32 = 3;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
