//! Headless round driver
//!
//! Runs scripted rounds against the simulation core, useful for balance
//! checks and profiling without a presentation layer. The bot steers toward
//! the nearest good item and away from bad ones.
//!
//! ```text
//! candy-catch [--mode normal|candy_rain|speed_rush|precision]
//!             [--seed N] [--ticks N] [--save-dir PATH]
//! ```

use chrono::Local;

use candy_catch::consts::TICK_RATE;
use candy_catch::sim::{GameMode, GamePhase, GameState, TickInput};
use candy_catch::{SaveStore, Session};

struct Options {
    mode: GameMode,
    seed: u64,
    max_ticks: u64,
    save_dir: String,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        mode: GameMode::Normal,
        seed: 42,
        max_ticks: 60 * 60 * TICK_RATE as u64,
        save_dir: "save".to_string(),
    };

    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--mode" => {
                let name = value()?;
                options.mode = match name.as_str() {
                    "normal" => GameMode::Normal,
                    "candy_rain" => GameMode::CandyRain,
                    "speed_rush" => GameMode::SpeedRush,
                    "precision" => GameMode::Precision,
                    other => return Err(format!("unknown mode: {other}")),
                };
            }
            "--seed" => {
                options.seed = value()?.parse().map_err(|e| format!("bad seed: {e}"))?;
            }
            "--ticks" => {
                options.max_ticks = value()?.parse().map_err(|e| format!("bad ticks: {e}"))?;
            }
            "--save-dir" => {
                options.save_dir = value()?;
            }
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    Ok(options)
}

/// Steer toward the closest good item, dodge the closest bad one
fn pilot(state: &GameState) -> TickInput {
    let px = state.player.pos.x;

    // Lowest item on screen is the most urgent
    let target = state
        .items
        .iter()
        .filter(|i| i.is_good)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
    let threat = state
        .items
        .iter()
        .filter(|i| !i.is_good)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let dir = match (target, threat) {
        (_, Some(t)) if (t.pos.x - px).abs() < t.size.x => (px - t.pos.x).signum(),
        (Some(g), _) => (g.pos.x - px).signum(),
        _ => 0.0,
    };
    TickInput {
        dir,
        toggle_pause: false,
    }
}

fn main() {
    env_logger::init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("candy-catch: {err}");
            std::process::exit(2);
        }
    };

    let today = Local::now().date_naive();
    let mut session = Session::open(SaveStore::new(&options.save_dir), today);
    if !session.start_round(options.mode, options.seed, 0) {
        eprintln!("candy-catch: mode {:?} is locked", options.mode);
        std::process::exit(1);
    }

    let tick_ms = 1000 / TICK_RATE as u64;
    for n in 1..=options.max_ticks {
        let input = match session.state.as_ref() {
            Some(state) if state.phase == GamePhase::Playing => pilot(state),
            _ => TickInput::default(),
        };
        let report = session.tick(&input, n * tick_ms);

        for id in &report.achievements_unlocked {
            println!("achievement: {}", id.title());
        }
        if let Some(rank) = report.highscore_rank {
            println!("new record! rank {}", rank + 1);
        }
        if let Some(state) = session.state.as_ref()
            && state.phase == GamePhase::GameOver
        {
            break;
        }
    }

    if let Some(hud) = session.hud() {
        println!(
            "score {} | level {} | combo {} | lives {} | {:.1}s",
            hud.score,
            hud.level,
            hud.combo,
            hud.lives,
            hud.elapsed_ms as f64 / 1000.0
        );
    }
    println!("highscores:");
    for (i, score) in session.highscores.entries().iter().enumerate() {
        println!("  {}. {score:>8}", i + 1);
    }
}
