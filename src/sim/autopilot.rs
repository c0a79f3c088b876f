//! Scripted player for demo and headless runs
//!
//! Waits `think_time` seconds on each question, then answers correctly with
//! probability `accuracy`. Seeded, so a run is reproducible.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::Session;

#[derive(Debug, Clone)]
pub struct Autopilot {
    accuracy: f64,
    think_time: f64,
    rng: Pcg32,
    /// Question currently being "thought about" and time spent on it
    current: Option<usize>,
    waited: f64,
}

impl Autopilot {
    pub fn new(accuracy: f64, think_time: f64, seed: u64) -> Self {
        let accuracy = if accuracy.is_nan() {
            0.0
        } else {
            accuracy.clamp(0.0, 1.0)
        };
        Self {
            accuracy,
            think_time: think_time.max(0.0),
            rng: Pcg32::seed_from_u64(seed),
            current: None,
            waited: 0.0,
        }
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Called once per tick; returns the option to submit, if ready
    pub fn decide(&mut self, session: &Session, dt: f64) -> Option<String> {
        let question = session.active_question()?;
        let index = session.state().question_index;

        if self.current != Some(index) {
            self.current = Some(index);
            self.waited = 0.0;
        }
        self.waited += dt;
        if self.waited < self.think_time {
            return None;
        }

        self.current = None;

        if self.rng.random_bool(self.accuracy) {
            return Some(question.answer.clone());
        }
        let wrong: Vec<&String> = question
            .options
            .iter()
            .filter(|o| **o != question.answer)
            .collect();
        match wrong.choose(&mut self.rng) {
            Some(option) => Some((*option).clone()),
            None => Some(question.answer.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{QuizBank, Tier};
    use crate::settings::Settings;
    use crate::sim::state::SessionSetup;
    use crate::sim::{TickInput, tick};
    use crate::track::Domain;

    fn new_session(seed: u64) -> Session {
        let setup = SessionSetup {
            expression: "10 - x**2".to_string(),
            domain: Domain::new(-3.0, 3.0).unwrap(),
            tier: Tier::Medium,
            seed,
        };
        Session::start(&setup, &QuizBank::builtin(), Settings::default()).unwrap()
    }

    fn play(session: &mut Session, pilot: &mut Autopilot) {
        let dt = 0.1;
        while !session.is_over() {
            let input = TickInput {
                answer: pilot.decide(session, dt),
            };
            tick(session, &input, dt);
        }
    }

    #[test]
    fn test_perfect_player_wins() {
        let mut session = new_session(1);
        let mut pilot = Autopilot::new(1.0, 1.0, 9);
        play(&mut session, &mut pilot);
        let summary = session.summary().unwrap();
        assert_eq!(summary.correct_count, 5);
        assert_eq!(summary.unanswered_count, 0);
        assert!(summary.success);
    }

    #[test]
    fn test_always_wrong_player_fails() {
        let mut session = new_session(2);
        let mut pilot = Autopilot::new(0.0, 0.5, 9);
        play(&mut session, &mut pilot);
        let summary = session.summary().unwrap();
        assert_eq!(summary.correct_count, 0);
        assert_eq!(summary.incorrect_count, 5);
        assert!(!summary.success);
    }

    #[test]
    fn test_slow_player_times_out() {
        let mut session = new_session(3);
        let mut pilot = Autopilot::new(1.0, 10.0, 9);
        play(&mut session, &mut pilot);
        assert_eq!(session.state.unanswered_count, 2);
        assert_eq!(session.state.correct_count, 0);
    }

    #[test]
    fn test_waits_before_answering() {
        let session = new_session(4);
        let mut pilot = Autopilot::new(1.0, 1.0, 9);
        assert_eq!(pilot.decide(&session, 0.5), None);
        assert!(pilot.decide(&session, 0.5).is_some());
    }

    #[test]
    fn test_accuracy_is_clamped() {
        assert_eq!(Autopilot::new(3.0, 0.0, 0).accuracy(), 1.0);
        assert_eq!(Autopilot::new(f64::NAN, 0.0, 0).accuracy(), 0.0);
    }
}
