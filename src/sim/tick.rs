//! Session transitions
//!
//! `tick` is the continuous, time-driven step; `submit_answer` is the
//! discrete, event-driven one. Timeouts fire from inside `tick`. Nothing is
//! accepted once the session reaches `GameOver`.

use super::state::{GameOverReason, Session, SessionEvent, SessionPhase};

/// Input collected for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Option the player clicked since the last tick
    pub answer: Option<String>,
}

/// Advance the session by `dt` simulated seconds
pub fn tick(session: &mut Session, input: &TickInput, dt: f64) {
    if session.is_over() {
        return;
    }

    if let Some(answer) = &input.answer {
        submit_answer(session, answer);
    }

    if !(dt.is_finite() && dt > 0.0) {
        return;
    }

    let speed_scale = session.settings().speed_scale;
    let end = session.track().end_position();
    let quiz_len = session.quiz().len();
    let state = &mut session.state;

    state.clock += dt;

    // Move the car
    let next = state.car_position + state.speed_factor * dt * speed_scale;
    if next >= end {
        state.car_position = end;
        finish(session, GameOverReason::ReachedEnd);
        return;
    }
    state.car_position = next;

    // Question timer
    if state.question_index < quiz_len && state.clock >= state.question_deadline {
        timeout(session);
    }
}

/// Answer the active question. Returns false if there was nothing to answer.
pub fn submit_answer(session: &mut Session, option: &str) -> bool {
    if session.is_over() {
        return false;
    }
    let index = session.state.question_index;
    let Some(question) = session.quiz().get(index) else {
        return false;
    };
    let correct = question.is_correct(option);
    let expected = question.answer.clone();

    let settings = session.settings().clone();
    let state = &mut session.state;
    if correct {
        state.correct_count += 1;
        state.speed_factor = settings.clamp_speed(state.speed_factor + settings.speed_step);
        state.feedback = "Correct! Speed increased.".to_string();
        state.events.push(SessionEvent::AnswerCorrect { index });
    } else {
        state.incorrect_count += 1;
        state.speed_factor = settings.clamp_speed(state.speed_factor - settings.speed_step);
        state.feedback = format!("Incorrect. The answer is: {expected}. Speed reduced.");
        state.events.push(SessionEvent::AnswerIncorrect { index, expected });
    }
    state.question_index += 1;
    state.question_deadline = state.clock + settings.question_time_limit;

    log::debug!(
        "Question {} answered {} (speed {:.1})",
        index + 1,
        if correct { "correctly" } else { "incorrectly" },
        state.speed_factor
    );
    true
}

/// The active question ran out of time
fn timeout(session: &mut Session) {
    let settings = session.settings().clone();
    let state = &mut session.state;
    let index = state.question_index;

    state.speed_factor = settings.clamp_speed(state.speed_factor - settings.speed_step);
    state.unanswered_count += 1;
    state.question_index += 1;
    state.question_deadline = state.clock + settings.question_time_limit;
    state.feedback = "Time's up. Speed reduced.".to_string();
    state.events.push(SessionEvent::Timeout { index });

    log::debug!(
        "Question {} timed out ({} unanswered)",
        index + 1,
        state.unanswered_count
    );

    if state.unanswered_count >= settings.unanswered_limit {
        finish(session, GameOverReason::TooManyUnanswered);
    }
}

fn finish(session: &mut Session, reason: GameOverReason) {
    let state = &mut session.state;
    state.phase = SessionPhase::GameOver;
    state.game_over_reason = Some(reason);
    state.events.push(SessionEvent::GameOver { reason });
    log::info!(
        "Game over ({:?}) after {:.1}s: {} correct, {} incorrect, {} unanswered",
        reason,
        state.clock,
        state.correct_count,
        state.incorrect_count,
        state.unanswered_count
    );
}
