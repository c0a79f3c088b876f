//! Coaster Quiz entry point
//!
//! Headless runner: builds a session from command-line choices, lets the
//! autopilot answer, and drives the fixed-timestep loop until game over.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;

use coaster_quiz::consts::*;
use coaster_quiz::sim::{Autopilot, Session, SessionEvent, SessionSetup, TickInput, tick};
use coaster_quiz::{ConfigError, Domain, LevelPreset, QuizBank, ScreenRect, Settings, Tier};

/// Ride a roller coaster shaped by your own function while answering math questions
#[derive(Debug, Parser)]
#[command(name = "coaster-quiz", version)]
struct Args {
    /// Track function of x (sympy-style: `10 - x**2`, `sin(x)*3`)
    #[arg(long, default_value = DEFAULT_EXPRESSION)]
    function: String,
    /// Left end of the domain
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    xmin: String,
    /// Right end of the domain
    #[arg(long, default_value = "10", allow_hyphen_values = true)]
    xmax: String,
    /// Difficulty level (1-5)
    #[arg(long, default_value_t = 1)]
    tier: u8,
    /// Use the level's built-in track instead of --function/--xmin/--xmax
    #[arg(long)]
    preset: bool,
    /// Seed for the question draw and the autopilot (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Probability the autopilot answers correctly
    #[arg(long, default_value_t = 0.7)]
    accuracy: f64,
    /// Seconds the autopilot thinks before answering
    #[arg(long, default_value_t = 2.0)]
    think_time: f64,
    /// JSON file overriding the game rules
    #[arg(long)]
    settings: Option<PathBuf>,
    /// JSON file with custom question pools
    #[arg(long)]
    questions: Option<PathBuf>,
    /// Pace the loop in real time instead of running as fast as possible
    #[arg(long)]
    realtime: bool,
    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

/// Drawing area for the car readout (the 1024x500 animation pane)
const ANIM_RECT: ScreenRect = ScreenRect {
    x: 0.0,
    y: 0.0,
    width: 1024.0,
    height: 500.0,
};

/// Frame time used when not pacing in real time
const FRAME_DT: f64 = 1.0 / 30.0;

fn build_session(args: &Args, seed: u64) -> Result<Session, ConfigError> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let bank = match &args.questions {
        Some(path) => QuizBank::from_json(&std::fs::read_to_string(path)?)?,
        None => QuizBank::builtin(),
    };
    let tier = Tier::from_level(args.tier)?;
    let (expression, domain) = if args.preset {
        let preset = LevelPreset::for_tier(tier);
        (preset.expression.to_string(), preset.domain()?)
    } else {
        (args.function.clone(), Domain::parse(&args.xmin, &args.xmax)?)
    };
    let setup = SessionSetup {
        expression,
        domain,
        tier,
        seed,
    };
    Session::start(&setup, &bank, settings)
}

/// Game loop state
struct Game {
    session: Session,
    pilot: Autopilot,
    accumulator: f64,
}

impl Game {
    /// Run simulation ticks for one frame
    fn update(&mut self, frame_dt: f64) {
        let frame_dt = frame_dt.min(0.1);
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                answer: self.pilot.decide(&self.session, SIM_DT),
            };
            tick(&mut self.session, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// Print what happened this frame
    fn report(&mut self) {
        for event in self.session.drain_events() {
            let car = self.session.car_screen(&ANIM_RECT);
            match event {
                SessionEvent::AnswerCorrect { .. }
                | SessionEvent::AnswerIncorrect { .. }
                | SessionEvent::Timeout { .. } => {
                    println!(
                        "[{:5.1}s] {} | speed {:.1} | car at ({:.0}, {:.0})",
                        self.session.state().clock,
                        self.session.feedback(),
                        self.session.state().speed_factor,
                        car.x,
                        car.y
                    );
                    if let Some(q) = self.session.active_question() {
                        println!("         {}: {}", self.session.progress_label(), q.prompt);
                    }
                }
                SessionEvent::GameOver { reason } => {
                    println!("[{:5.1}s] Game over: {:?}", self.session.state().clock, reason);
                }
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let session = match build_session(&args, seed) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Could not start session: {}", e);
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    let track = session.track();
    if track.is_fallback() {
        println!("Could not use {:?}; riding f(x) = {} instead", args.function, track.expression());
    }
    let (ymin, ymax) = track.y_bounds();
    println!(
        "Track f(x) = {} over [{}, {}], y in [{:.2}, {:.2}], {} samples",
        track.expression(),
        track.domain().xmin(),
        track.domain().xmax(),
        ymin,
        ymax,
        track.len()
    );
    println!("Tier {} ({}), seed {}", session.quiz().tier().level(), session.quiz().tier(), seed);
    if let Some(q) = session.active_question() {
        println!("         {}: {}", session.progress_label(), q.prompt);
    }

    let pilot = Autopilot::new(args.accuracy, args.think_time, seed ^ 0x9E37_79B9_7F4A_7C15);
    let mut game = Game {
        session,
        pilot,
        accumulator: 0.0,
    };

    let mut last_time = Instant::now();
    while !game.session.is_over() {
        let frame_dt = if args.realtime {
            std::thread::sleep(Duration::from_secs_f64(FRAME_DT));
            let now = Instant::now();
            let dt = now.duration_since(last_time).as_secs_f64();
            last_time = now;
            dt
        } else {
            FRAME_DT
        };
        game.update(frame_dt);
        game.report();
    }

    let Some(summary) = game.session.summary() else {
        return;
    };
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize summary: {}", e),
        }
    } else {
        println!();
        println!("{}", summary.headline());
        println!(
            "Correct answers: {}/{}",
            summary.correct_count, summary.total_questions
        );
        println!("Time: {:.1} s", summary.elapsed_secs);
    }
}
