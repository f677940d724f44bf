/// Entry point and host loop.
///
/// Usage:
///   aventura                 play (level from config, else built-in)
///   aventura --dump-level    print the built-in level as TOML and exit
///
/// Logging goes through `env_logger` (`RUST_LOG=info` and up). The
/// completion report is printed as JSON after the terminal is restored.

mod config;
mod domain;
mod report;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use config::GameConfig;
use domain::entity::Intents;
use report::LevelReport;
use sim::event::GameEvent;
use sim::level::LevelDef;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::status::StatusLine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    env_logger::init();

    if std::env::args().any(|a| a == "--dump-level") {
        match LevelDef::builtin().to_toml_string() {
            Ok(text) => print!("{text}"),
            Err(e) => eprintln!("Could not serialize level: {e}"),
        }
        return;
    }

    let config = GameConfig::load();
    let level = choose_level(&config);
    let mut world = WorldState::new(level, config.physics.clone());

    let mut status = StatusLine::new();
    let enhanced = match status.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let mut reports = Vec::new();
    let result = game_loop(&mut world, &mut status, enhanced, &config, &mut reports);

    if let Err(e) = status.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    for report in &reports {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Could not serialize report: {e}"),
        }
    }
}

/// Level from config if it loads, otherwise the built-in one.
fn choose_level(config: &GameConfig) -> LevelDef {
    let Some(path) = &config.level_file else {
        return LevelDef::builtin();
    };
    match LevelDef::load(path) {
        Ok(level) => level,
        Err(e) => {
            log::warn!("{e} ({}); using built-in level", path.display());
            LevelDef::builtin()
        }
    }
}

fn game_loop(
    world: &mut WorldState,
    status: &mut StatusLine,
    enhanced: bool,
    config: &GameConfig,
    reports: &mut Vec<LevelReport>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced;

    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut jump_pending = false;

    loop {
        kb.drain_events();

        if kb.quit_requested() {
            break;
        }
        if kb.restart_requested() {
            log::info!("restarting '{}'", world.level.name);
            world.restart();
            status.set_message("");
            jump_pending = false;
            last_tick = Instant::now();
        }

        // Latch presses between ticks so a quick tap isn't lost.
        let mut intents = kb.intents();
        jump_pending |= intents.jump;

        if last_tick.elapsed() >= tick_rate {
            let now = Instant::now();
            let frame_dt = now.duration_since(last_tick).as_secs_f32();
            last_tick = now;

            if world.phase == Phase::Playing {
                intents.jump = std::mem::take(&mut jump_pending);
                for (n, dt) in step::fixed_steps(frame_dt, config.timing.fixed_step_ms).into_iter().enumerate() {
                    // Jump is a one-shot: only the first sub-step sees it.
                    let sub = if n == 0 { intents } else { Intents { jump: false, ..intents } };
                    let events = step::step(world, dt, sub);
                    process_events(world, config, &events, status, reports);
                }
            } else {
                jump_pending = false;
            }
        }

        status.draw(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Feed events to the status line and collect completion reports.
fn process_events(
    world: &WorldState,
    config: &GameConfig,
    events: &[GameEvent],
    status: &mut StatusLine,
    reports: &mut Vec<LevelReport>,
) {
    for event in events {
        match event {
            GameEvent::Jumped => log::trace!("jump at x={:.0}", world.player.x),
            GameEvent::CoinCollected { index, total } => {
                log::debug!("coin {index} picked up");
                status.set_message(format!("Coin! ({total})"));
            }
            GameEvent::CheckpointReached { time } => {
                status.set_message(format!("Checkpoint at {time:.1}s"));
            }
            GameEvent::BlockSettledInHole { index } => {
                status.set_message(format!("Block {index} filled the hole"));
            }
            GameEvent::LifeLost { remaining } => {
                status.set_message(format!("Ouch! {remaining} lives left"));
            }
            GameEvent::GameOver { coins } => {
                status.set_message(format!("Out of lives with {coins} coins"));
            }
            GameEvent::LevelCompleted { .. } => {
                if let Some(report) = LevelReport::from_event(event, &config.player, &world.level.name) {
                    reports.push(report);
                }
            }
        }
    }
}
