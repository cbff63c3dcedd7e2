#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy wandering system that proposes one random step per enemy and pass.
//!
//! Passes are gated on simulated time: the first pass runs on the first tick
//! of a session, later passes run once the time since the previous pass
//! strictly exceeds the configured interval.

use std::time::Duration;

use log::trace;
use nen_blaster_core::{CellCoord, Command, Direction, Enemy, Event, GameConfig, RandomSource};

/// Configuration parameters required to construct the wander system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    move_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided movement cadence.
    #[must_use]
    pub const fn new(move_interval: Duration) -> Self {
        Self { move_interval }
    }
}

impl From<&GameConfig> for Config {
    fn from(config: &GameConfig) -> Self {
        Self::new(config.enemy_move_interval())
    }
}

/// Pure system that turns elapsed time into enemy step commands.
#[derive(Debug)]
pub struct Wander {
    move_interval: Duration,
    since_last_pass: Option<Duration>,
    options: Vec<Direction>,
}

impl Wander {
    /// Creates a new wander system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            move_interval: config.move_interval,
            since_last_pass: None,
            options: Vec::with_capacity(Direction::ALL.len()),
        }
    }

    /// Forgets the previous pass so the next tick moves enemies immediately.
    pub fn reset(&mut self) {
        self.since_last_pass = None;
    }

    /// Consumes world events and the enemy roster to emit step commands.
    ///
    /// Every enemy with at least one walkable neighbour receives exactly one
    /// [`Command::StepEnemy`] per pass, choosing uniformly among the walkable
    /// directions in [`Direction::ALL`] order. Enemies are visited in the
    /// order provided.
    pub fn handle<R, F>(
        &mut self,
        events: &[Event],
        enemies: &[Enemy],
        is_walkable: F,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: RandomSource + ?Sized,
        F: Fn(CellCoord) -> bool,
    {
        let mut pass_due = false;
        for event in events {
            match event {
                Event::SessionStarted { .. } => self.reset(),
                Event::TimeAdvanced { dt } => pass_due |= self.advance(*dt),
                _ => {}
            }
        }

        if !pass_due {
            return;
        }

        trace!("enemy move pass over {} enemies", enemies.len());
        for enemy in enemies {
            self.options.clear();
            self.options.extend(
                Direction::ALL
                    .iter()
                    .copied()
                    .filter(|direction| enemy.cell.step(*direction).is_some_and(&is_walkable)),
            );

            if self.options.is_empty() {
                continue;
            }

            let direction = self.options[rng.next_below(self.options.len())];
            out.push(Command::StepEnemy {
                enemy: enemy.id,
                direction,
            });
        }
    }

    fn advance(&mut self, dt: Duration) -> bool {
        let due = match self.since_last_pass {
            None => true,
            Some(elapsed) => elapsed.saturating_add(dt) > self.move_interval,
        };

        self.since_last_pass = Some(if due {
            Duration::ZERO
        } else {
            self.since_last_pass.unwrap_or_default().saturating_add(dt)
        });

        due
    }
}
