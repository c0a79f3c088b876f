//! Quiz bank: difficulty tiers, question pools and per-session draws
//!
//! Pools are immutable once built. Each session draws its questions without
//! replacement from exactly one tier, using the caller's RNG.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::OPTION_COUNT;
use crate::error::ConfigError;

/// Difficulty tier (levels 1-5 on the level-select screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
    VeryHard,
    Einstein,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Easy,
        Tier::Medium,
        Tier::Hard,
        Tier::VeryHard,
        Tier::Einstein,
    ];

    /// Map a 1-based level number to its tier
    pub fn from_level(level: u8) -> Result<Self, ConfigError> {
        match level {
            1..=5 => Ok(Self::ALL[level as usize - 1]),
            _ => Err(ConfigError::UnknownTier(level)),
        }
    }

    /// 1-based level number
    pub fn level(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Medium => "Medium",
            Tier::Hard => "Hard",
            Tier::VeryHard => "Very Hard",
            Tier::Einstein => "Einstein",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl Question {
    pub fn new(prompt: &str, options: [&str; OPTION_COUNT], answer: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }

    /// The answer must be one of exactly `OPTION_COUNT` distinct options
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| {
            Err(ConfigError::InvalidQuestion {
                prompt: self.prompt.clone(),
                reason,
            })
        };
        if self.prompt.trim().is_empty() {
            return invalid("prompt is empty".to_string());
        }
        if self.options.len() != OPTION_COUNT {
            return invalid(format!(
                "expected {} options, found {}",
                OPTION_COUNT,
                self.options.len()
            ));
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return invalid(format!("option {option:?} is repeated"));
            }
        }
        if !self.options.contains(&self.answer) {
            return invalid(format!("answer {:?} is not among the options", self.answer));
        }
        Ok(())
    }
}

/// The ordered questions for one play-through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    tier: Tier,
    questions: Vec<Question>,
}

impl QuizSession {
    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

/// One pool per tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizBank {
    pools: Vec<TierPool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TierPool {
    tier: Tier,
    questions: Vec<Question>,
}

impl Default for QuizBank {
    fn default() -> Self {
        Self::builtin()
    }
}

impl QuizBank {
    /// Build a bank from explicit pools, validating every question
    pub fn new(pools: Vec<(Tier, Vec<Question>)>) -> Result<Self, ConfigError> {
        let mut bank = Self { pools: Vec::new() };
        for (tier, questions) in pools {
            for q in &questions {
                q.validate()?;
            }
            match bank.pools.iter_mut().find(|p| p.tier == tier) {
                Some(pool) => pool.questions.extend(questions),
                None => bank.pools.push(TierPool { tier, questions }),
            }
        }
        bank.pools.sort_by_key(|p| p.tier);
        Ok(bank)
    }

    /// Load a bank from JSON: `{ "pools": [{ "tier": "Easy", "questions": [...] }] }`
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: QuizBank = serde_json::from_str(json)?;
        Self::new(raw.pools.into_iter().map(|p| (p.tier, p.questions)).collect())
    }

    /// The questions available for `tier` (empty if the tier has no pool)
    pub fn pool(&self, tier: Tier) -> &[Question] {
        self.pools
            .iter()
            .find(|p| p.tier == tier)
            .map(|p| p.questions.as_slice())
            .unwrap_or(&[])
    }

    /// Draw `count` distinct questions from `tier`, uniformly at random
    pub fn draw_session<R: Rng + ?Sized>(
        &self,
        tier: Tier,
        count: usize,
        rng: &mut R,
    ) -> Result<QuizSession, ConfigError> {
        let pool = self.pool(tier);
        if pool.len() < count {
            return Err(ConfigError::PoolTooSmall {
                tier,
                available: pool.len(),
                required: count,
            });
        }
        let mut questions = pool.to_vec();
        questions.shuffle(rng);
        questions.truncate(count);
        log::info!("Drew {} {} questions from a pool of {}", count, tier, pool.len());
        Ok(QuizSession { tier, questions })
    }

    /// The built-in pools, five questions per tier
    pub fn builtin() -> Self {
        let q = Question::new;
        let pools = vec![
            TierPool {
                tier: Tier::Easy,
                questions: vec![
                    q("What is 5 + 3?", ["10", "6", "8", "7"], "8"),
                    q("What is 7 × 6?", ["36", "42", "40", "48"], "42"),
                    q(
                        "A triangle has two sides of 5 cm. What is it called?",
                        ["Equilateral", "Scalene", "Right", "Isosceles"],
                        "Isosceles",
                    ),
                    q("What is 2²?", ["4", "2", "8", "6"], "4"),
                    q("What is the square root of 81?", ["8", "9", "7", "6"], "9"),
                ],
            },
            TierPool {
                tier: Tier::Medium,
                questions: vec![
                    q("What is 12 ÷ 4?", ["4", "3", "6", "2"], "3"),
                    q("If x + 3 = 10, what is x?", ["7", "10", "3", "13"], "7"),
                    q(
                        "A square has an area of 16 cm². How long is each side?",
                        ["3 cm", "5 cm", "6 cm", "4 cm"],
                        "4 cm",
                    ),
                    q("What is π approximately?", ["3.21", "3.41", "3.04", "3.14"], "3.14"),
                    q("What is the derivative of x³?", ["3x", "x²", "3x²", "x³"], "3x²"),
                ],
            },
            TierPool {
                tier: Tier::Hard,
                questions: vec![
                    q("What is the derivative of ln(x)?", ["ln(x)", "1/x", "x", "e^x"], "1/x"),
                    q(
                        "What is the integral of x dx?",
                        ["(1/2)x² + C", "x + C", "x² + C", "e^x + C"],
                        "(1/2)x² + C",
                    ),
                    q(
                        "If f(x) = x² + 2x, what is f'(x)?",
                        ["x + 2", "x² + 2", "2x + 2", "2x"],
                        "2x + 2",
                    ),
                    q(
                        "What is the area of a circle of radius 5?",
                        ["25π", "10π", "5π", "50π"],
                        "25π",
                    ),
                    q(
                        "What is the derivative of e^(3x)?",
                        ["3e^(3x)", "e^(3x)", "x*e^(3x)", "ln(e)*e^(3x)"],
                        "3e^(3x)",
                    ),
                ],
            },
            TierPool {
                tier: Tier::VeryHard,
                questions: vec![
                    q(
                        "If f(x) = e^x + ln(x), what is f'(x)?",
                        ["ln(x) + 1/x", "e^x", "e^x + 1/x", "x e^x"],
                        "e^x + 1/x",
                    ),
                    q(
                        "Where does f(x) = x³ - 3x² + 2x have a local maximum?",
                        ["x = 1", "x = 2", "x = 0", "x = -1"],
                        "x = 1",
                    ),
                    q(
                        "A right triangle has hypotenuse 10 and one leg 6. How long is the other leg?",
                        ["4", "8", "6", "5"],
                        "8",
                    ),
                    q(
                        "What is the integral of sec²(x) dx?",
                        ["cos(x) + C", "tan(x) + C", "sin(x) + C", "-tan(x) + C"],
                        "tan(x) + C",
                    ),
                    q(
                        "When does the infinite geometric series a + ar + ar² + ... converge?",
                        ["r < -1", "|r| > 1", "r > 1", "|r| < 1"],
                        "|r| < 1",
                    ),
                ],
            },
            TierPool {
                tier: Tier::Einstein,
                questions: vec![
                    q(
                        "What are the real solutions of x⁴ - 5x² + 4 = 0?",
                        ["0, ±1", "±3, ±2", "±2, ±1", "±4, ±2"],
                        "±2, ±1",
                    ),
                    q(
                        "What is the derivative of sinh(x)?",
                        ["sinh(x)", "cosh(x)", "-cosh(x)", "-sinh(x)"],
                        "cosh(x)",
                    ),
                    q(
                        "If f(x) = x^x, what is f'(x)?",
                        ["x^x(1 + ln(x))", "x^(x-1)", "ln(x)", "x^x * ln(x)"],
                        "x^x(1 + ln(x))",
                    ),
                    q(
                        "What does it mean if a matrix A has determinant 0?",
                        ["It is diagonal", "It is invertible", "Its trace is 0", "It is singular"],
                        "It is singular",
                    ),
                    q(
                        "If A is an orthogonal matrix, what is A⁻¹?",
                        ["A⁻¹ does not exist", "A⁻¹ = -A", "A⁻¹ = A²", "A⁻¹ = Aᵀ"],
                        "A⁻¹ = Aᵀ",
                    ),
                ],
            },
        ];
        Self { pools }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::QUESTIONS_PER_SESSION;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_tier_levels_round_trip() {
        for level in 1..=5 {
            assert_eq!(Tier::from_level(level).unwrap().level(), level);
        }
        assert!(matches!(Tier::from_level(0), Err(ConfigError::UnknownTier(0))));
        assert!(matches!(Tier::from_level(6), Err(ConfigError::UnknownTier(6))));
    }

    #[test]
    fn test_builtin_questions_are_valid() {
        let bank = QuizBank::builtin();
        for tier in Tier::ALL {
            let pool = bank.pool(tier);
            assert!(pool.len() >= QUESTIONS_PER_SESSION, "{tier} pool too small");
            for q in pool {
                q.validate().unwrap();
            }
        }
    }

    #[test]
    fn test_draw_full_pool_returns_each_question_once() {
        let bank = QuizBank::builtin();
        let mut rng = Pcg32::seed_from_u64(7);
        let session = bank.draw_session(Tier::Hard, 5, &mut rng).unwrap();
        assert_eq!(session.len(), 5);
        assert_eq!(session.tier(), Tier::Hard);

        let mut drawn: Vec<&str> = session.questions().iter().map(|q| q.prompt.as_str()).collect();
        let mut pool: Vec<&str> = bank.pool(Tier::Hard).iter().map(|q| q.prompt.as_str()).collect();
        drawn.sort();
        pool.sort();
        assert_eq!(drawn, pool);
    }

    #[test]
    fn test_draws_are_independent() {
        let bank = QuizBank::builtin();
        let mut rng = Pcg32::seed_from_u64(42);
        // Two consecutive draws from the same RNG should not always agree
        let orders: Vec<Vec<String>> = (0..8)
            .map(|_| {
                bank.draw_session(Tier::Easy, 5, &mut rng)
                    .unwrap()
                    .questions()
                    .iter()
                    .map(|q| q.prompt.clone())
                    .collect()
            })
            .collect();
        assert!(orders.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_pool_too_small() {
        let bank = QuizBank::new(vec![(
            Tier::Easy,
            vec![Question::new("1 + 1?", ["1", "2", "3", "4"], "2")],
        )])
        .unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(matches!(
            bank.draw_session(Tier::Easy, 5, &mut rng),
            Err(ConfigError::PoolTooSmall { available: 1, required: 5, .. })
        ));
        assert!(matches!(
            bank.draw_session(Tier::Einstein, 5, &mut rng),
            Err(ConfigError::PoolTooSmall { available: 0, .. })
        ));
    }

    #[test]
    fn test_question_validation() {
        let bad_answer = Question::new("2 + 2?", ["1", "2", "3", "5"], "4");
        assert!(matches!(
            bad_answer.validate(),
            Err(ConfigError::InvalidQuestion { .. })
        ));
        let repeated = Question::new("2 + 2?", ["4", "4", "3", "5"], "4");
        assert!(repeated.validate().is_err());
        let short = Question {
            prompt: "2 + 2?".to_string(),
            options: vec!["4".to_string(), "5".to_string()],
            answer: "4".to_string(),
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_bank_from_json() {
        let json = r#"{
            "pools": [{
                "tier": "Medium",
                "questions": [
                    { "prompt": "3 × 3?", "options": ["6", "9", "12", "3"], "answer": "9" }
                ]
            }]
        }"#;
        let bank = QuizBank::from_json(json).unwrap();
        assert_eq!(bank.pool(Tier::Medium).len(), 1);
        assert!(bank.pool(Tier::Medium)[0].is_correct("9"));
        assert!(bank.pool(Tier::Easy).is_empty());

        let invalid = json.replace(r#""answer": "9""#, r#""answer": "10""#);
        assert!(QuizBank::from_json(&invalid).is_err());
    }
}
