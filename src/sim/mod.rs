//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated clock only (advanced by `tick`)
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use state::{
    GameOverReason, Session, SessionEvent, SessionPhase, SessionSetup, SessionState,
    SessionSummary,
};
pub use tick::{TickInput, submit_answer, tick};
