#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Nen Blaster sessions in the terminal.

mod input;
mod settings;

use std::{
    cell::RefCell,
    io::{self, Stdout},
    path::PathBuf,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use nen_blaster_core::{Outcome, SessionState, TITLE_BANNER};
use nen_blaster_rendering::{RenderingBackend, Screen, TextBackend};
use nen_blaster_simulation::Simulation;

use crate::input::{parse_script, Intent};

/// Command-line arguments accepted by the Nen Blaster CLI.
#[derive(Debug, Parser)]
#[command(name = "nen-blaster", about = "Blast the Phantom Troupe on a tile grid")]
struct CliArgs {
    /// TOML file overriding the default game configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for level generation and enemy movement; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Keys consumed one per tick (w/a/s/d or k/h/j/l to move, space or b to bomb, . to wait).
    #[arg(long, default_value = "")]
    script: String,

    /// Upper bound on ticks played per round.
    #[arg(long, default_value_t = 600)]
    max_ticks: u64,

    /// Pace ticks against the wall clock instead of running them back to back.
    #[arg(long)]
    realtime: bool,

    /// Draw the grid after every tick.
    #[arg(long)]
    show_frames: bool,

    /// Number of sessions to play in a row.
    #[arg(long, default_value_t = 1)]
    rounds: u32,
}

/// Entry point for the Nen Blaster command-line interface.
fn main() -> Result<()> {
    init_logging();
    let args = CliArgs::parse();

    let config = settings::load(args.config.as_deref())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("{TITLE_BANNER} seed {seed}");

    let mut simulation =
        Simulation::seeded(config, seed).context("game configuration was rejected")?;
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&outcomes);
    simulation.on_terminal_outcome(move |outcome| sink.borrow_mut().push(outcome));

    let mut backend = TextBackend::new(io::stdout()).with_clear_screen(args.realtime);
    backend.present(&Screen::Start.frame(&simulation.snapshot()))?;

    let intents = parse_script(&args.script);
    for round in 0..args.rounds {
        if round == 0 {
            let _ = simulation.start_session();
        } else {
            let _ = simulation.restart_session();
        }
        play_round(&mut simulation, &mut backend, &intents, &args)?;

        let snapshot = simulation.snapshot();
        match snapshot.state {
            SessionState::Ended(outcome) => {
                if !args.show_frames {
                    backend.present(&Screen::Playing.frame(&snapshot))?;
                }
                backend.present(&Screen::End(outcome).frame(&snapshot))?;
            }
            SessionState::Initializing | SessionState::Running => {
                backend.present(&Screen::Playing.frame(&snapshot))?;
                info!(
                    "round {} unfinished after {} ticks",
                    round + 1,
                    snapshot.tick_index
                );
            }
        }
    }

    let outcomes = outcomes.borrow();
    let victories = outcomes
        .iter()
        .filter(|outcome| **outcome == Outcome::Victory)
        .count();
    info!(
        "{} rounds played: {victories} passed, {} failed",
        args.rounds,
        outcomes.len() - victories
    );
    Ok(())
}

fn play_round(
    simulation: &mut Simulation,
    backend: &mut TextBackend<Stdout>,
    intents: &[Intent],
    args: &CliArgs,
) -> Result<()> {
    let tick_interval = simulation.config().tick_interval();
    let mut last_frame = Instant::now();
    let mut ticks = 0u64;
    let mut script = intents.iter().copied();

    while simulation.state().is_running() && ticks < args.max_ticks {
        match script.next().unwrap_or(Intent::Wait) {
            Intent::Move(direction) => {
                let _ = simulation.move_player(direction);
            }
            Intent::PlaceBomb => {
                let _ = simulation.place_bomb();
            }
            Intent::Wait => {}
        }

        if args.realtime {
            let mut ran = 0;
            while ran == 0 && simulation.state().is_running() {
                thread::sleep(tick_interval.saturating_sub(last_frame.elapsed()));
                let now = Instant::now();
                ran = paced_advance(simulation, now.duration_since(last_frame));
                last_frame = now;
            }
            ticks += ran as u64;
        } else {
            let _ = simulation.tick();
            ticks += 1;
        }

        if args.show_frames {
            backend.present(&Screen::Playing.frame(&simulation.snapshot()))?;
        }
    }

    Ok(())
}

/// Feeds wall-clock time into the simulation without ever running more than
/// one tick, so each script symbol maps to exactly one tick. Lag beyond one
/// interval is dropped.
fn paced_advance(simulation: &mut Simulation, elapsed: Duration) -> usize {
    let tick_interval = simulation.config().tick_interval();
    simulation.advance(elapsed.min(tick_interval))
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
}
