//! Session state and core simulation types
//!
//! A `Session` owns everything one play-through needs: the track, the drawn
//! questions, the rules and the mutable `SessionState`. Time is simulated;
//! the only clock is the sum of `dt` values passed to `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::quiz::{Question, QuizBank, QuizSession, Tier};
use crate::settings::Settings;
use crate::track::{Domain, ScreenRect, Track, TrackPoint};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Car moving, quiz running
    Running,
    /// Run ended (terminal)
    GameOver,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// The car reached the last track sample
    ReachedEnd,
    /// Too many questions timed out
    TooManyUnanswered,
}

/// Things that happened during a tick, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    AnswerCorrect { index: usize },
    AnswerIncorrect { index: usize, expected: String },
    Timeout { index: usize },
    GameOver { reason: GameOverReason },
}

/// Mutable per-run state (single owner, mutated only by the transitions in `tick`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Fractional track index, in `[0, track.len() - 1]`
    pub car_position: f64,
    /// Car speed multiplier, within the configured bounds
    pub speed_factor: f64,
    /// Index of the active question (== quiz length once exhausted)
    pub question_index: usize,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub unanswered_count: u32,
    /// Simulated seconds since the session started
    pub clock: f64,
    /// Clock value at which the active question times out
    pub question_deadline: f64,
    pub phase: SessionPhase,
    pub game_over_reason: Option<GameOverReason>,
    /// Outcome of the most recent answer or timeout
    pub feedback: String,
    /// Pending events (drained by the presentation layer)
    #[serde(skip)]
    pub events: Vec<SessionEvent>,
}

impl SessionState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            car_position: 0.0,
            speed_factor: settings.speed_initial,
            question_index: 0,
            correct_count: 0,
            incorrect_count: 0,
            unanswered_count: 0,
            clock: 0.0,
            question_deadline: settings.question_time_limit,
            phase: SessionPhase::Running,
            game_over_reason: None,
            feedback: String::new(),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }
}

/// What the player chose on the setup screen
#[derive(Debug, Clone)]
pub struct SessionSetup {
    pub expression: String,
    pub domain: Domain,
    pub tier: Tier,
    /// Seed for the question draw
    pub seed: u64,
}

/// End-of-run results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub unanswered_count: u32,
    pub total_questions: usize,
    pub elapsed_secs: f64,
    pub success: bool,
    pub reason: GameOverReason,
}

impl SessionSummary {
    pub fn headline(&self) -> &'static str {
        if self.success {
            "Roller coaster success!"
        } else {
            "The adventure failed"
        }
    }
}

/// One complete play-through
#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
    track: Track,
    quiz: QuizSession,
    seed: u64,
    /// Mutated only by the transitions in `tick.rs`
    pub(crate) state: SessionState,
}

impl Session {
    /// Assemble a session from an already sampled track and drawn quiz
    pub fn new(track: Track, quiz: QuizSession, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        if quiz.is_empty() {
            return Err(ConfigError::InvalidSettings(
                "a session needs at least one question".to_string(),
            ));
        }
        let state = SessionState::new(&settings);
        Ok(Self {
            settings,
            track,
            quiz,
            seed: 0,
            state,
        })
    }

    /// Sample the track, draw the questions and start the clock
    pub fn start(setup: &SessionSetup, bank: &QuizBank, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let track = Track::from_expression(&setup.expression, setup.domain, settings.sample_count);
        let mut rng = Pcg32::seed_from_u64(setup.seed);
        let quiz = bank.draw_session(setup.tier, settings.questions_per_session, &mut rng)?;
        log::info!(
            "Session started: f(x) = {} over [{}, {}], tier {}, seed {}",
            track.expression(),
            setup.domain.xmin(),
            setup.domain.xmax(),
            setup.tier,
            setup.seed
        );
        let mut session = Self::new(track, quiz, settings)?;
        session.seed = setup.seed;
        Ok(session)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn quiz(&self) -> &QuizSession {
        &self.quiz
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Read-only view of the live session state
    #[inline]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// The question awaiting an answer, if any remain
    pub fn active_question(&self) -> Option<&Question> {
        if self.is_over() {
            return None;
        }
        self.quiz.get(self.state.question_index)
    }

    /// Seconds left on the active question (0 when there is none)
    pub fn remaining_time(&self) -> f64 {
        if self.active_question().is_none() {
            return 0.0;
        }
        (self.state.question_deadline - self.state.clock).max(0.0)
    }

    pub fn feedback(&self) -> &str {
        &self.state.feedback
    }

    /// "Question i of K", with i clamped to K
    pub fn progress_label(&self) -> String {
        let total = self.quiz.len();
        format!(
            "Question {} of {}",
            (self.state.question_index + 1).min(total),
            total
        )
    }

    /// Fraction of the quiz already behind the player
    pub fn progress_fraction(&self) -> f64 {
        self.state.question_index as f64 / self.quiz.len() as f64
    }

    /// Car location in world space
    pub fn car_point(&self) -> TrackPoint {
        self.track.point_at(self.state.car_position)
    }

    /// Car location inside `rect`, using the configured margin
    pub fn car_screen(&self, rect: &ScreenRect) -> Vec2 {
        self.track
            .world_to_screen(self.state.car_position, rect, self.settings.track_margin)
    }

    /// Success is a pure read of the correct-answer count
    pub fn is_success(&self) -> bool {
        self.state.correct_count >= self.settings.success_threshold
    }

    /// Final results, once the session is over
    pub fn summary(&self) -> Option<SessionSummary> {
        let reason = self.state.game_over_reason?;
        Some(SessionSummary {
            correct_count: self.state.correct_count,
            incorrect_count: self.state.incorrect_count,
            unanswered_count: self.state.unanswered_count,
            total_questions: self.quiz.len(),
            elapsed_secs: self.state.clock,
            success: self.is_success(),
            reason,
        })
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.state.events)
    }
}
