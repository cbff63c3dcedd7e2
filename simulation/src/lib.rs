#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick driver that owns the world, its systems and the random source.
//!
//! [`Simulation`] is the single mutator of a session. Every tick runs the
//! fixed pipeline `Tick` → enemy wandering → `StepEnemy` commands →
//! `EvaluateOutcome`, and input-driven actions are applied atomically between
//! ticks. Hosts that share the driver across threads wrap it in a mutex.

use std::{fmt, time::Duration};

use log::{debug, info};
use nen_blaster_core::{
    Command, ConfigError, Direction, Event, GameConfig, Outcome, RandomSource, SeededRandom,
    SessionSnapshot, SessionState,
};
use nen_blaster_system_level_generation::{Config as LevelGenerationConfig, LevelGeneration};
use nen_blaster_system_wander::{Config as WanderConfig, Wander};
use nen_blaster_world::{self as world, query, World};

/// Upper bound on ticks run by a single [`Simulation::advance`] call.
///
/// Wall time beyond this budget is dropped so a stalled host does not replay
/// a long backlog in one burst.
pub const MAX_CATCH_UP_TICKS: usize = 8;

type OutcomeCallback = Box<dyn FnMut(Outcome)>;

/// Fixed-rate driver for Nen Blaster sessions.
pub struct Simulation<R = SeededRandom>
where
    R: RandomSource,
{
    config: GameConfig,
    world: World,
    level_generation: LevelGeneration,
    wander: Wander,
    rng: R,
    events: Vec<Event>,
    commands: Vec<Command>,
    accumulator: Duration,
    callbacks: Vec<OutcomeCallback>,
}

impl Simulation<SeededRandom> {
    /// Creates a driver whose whole session history is determined by `seed`.
    pub fn seeded(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        debug!("seeding simulation with {seed:#x}");
        Self::new(config, SeededRandom::from_seed(seed))
    }
}

impl<R> Simulation<R>
where
    R: RandomSource,
{
    /// Validates the configuration and creates a driver awaiting its first session.
    pub fn new(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            world: World::new(&config),
            level_generation: LevelGeneration::new(LevelGenerationConfig::from(&config)),
            wander: Wander::new(WanderConfig::from(&config)),
            config,
            rng,
            events: Vec::new(),
            commands: Vec::new(),
            accumulator: Duration::ZERO,
            callbacks: Vec::new(),
        })
    }

    /// Generates a fresh level and starts a new session on it.
    pub fn start_session(&mut self) -> &[Event] {
        self.events.clear();
        let level = self.level_generation.generate(&mut self.rng);
        info!(
            "starting {}x{} session with {} enemies and {} allies",
            level.grid.columns(),
            level.grid.rows(),
            level.enemies.len(),
            level.allies.len()
        );

        world::apply(
            &mut self.world,
            Command::LoadLevel { level },
            &mut self.events,
        );
        self.wander.reset();
        self.accumulator = Duration::ZERO;
        &self.events
    }

    /// Tears the current session down and starts another one.
    pub fn restart_session(&mut self) -> &[Event] {
        debug!(
            "restarting session after {} ticks in state {:?}",
            query::tick_index(&self.world),
            query::state(&self.world)
        );
        self.start_session()
    }

    /// Runs a single fixed tick and returns the events it produced.
    ///
    /// Returns an empty slice without touching the world unless the session
    /// is running.
    pub fn tick(&mut self) -> &[Event] {
        self.events.clear();
        self.run_tick();
        &self.events
    }

    /// Feeds elapsed wall time and runs every fixed tick that became due.
    ///
    /// At most [`MAX_CATCH_UP_TICKS`] ticks run per call. Once the session
    /// ends the accumulator is discarded and no further ticks fire. Returns
    /// the number of ticks that ran; [`Simulation::events`] holds their
    /// combined events.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        self.events.clear();
        if !self.state().is_running() {
            self.accumulator = Duration::ZERO;
            return 0;
        }

        let step = self.config.tick_interval();
        self.accumulator = self.accumulator.saturating_add(elapsed);

        let mut ticks = 0;
        while self.accumulator >= step && ticks < MAX_CATCH_UP_TICKS {
            self.run_tick();
            self.accumulator -= step;
            ticks += 1;

            if !self.state().is_running() {
                self.accumulator = Duration::ZERO;
                break;
            }
        }

        if self.accumulator >= step {
            debug!("dropping {:?} of simulation backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        ticks
    }

    /// Moves the player one cell if the destination is walkable.
    pub fn move_player(&mut self, direction: Direction) -> &[Event] {
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::MovePlayer { direction },
            &mut self.events,
        );
        &self.events
    }

    /// Arms a bomb on the player's cell when capacity and occupancy allow it.
    pub fn place_bomb(&mut self) -> &[Event] {
        self.events.clear();
        world::apply(&mut self.world, Command::PlaceBomb, &mut self.events);
        &self.events
    }

    /// Registers a callback fired once whenever a session reaches its outcome.
    ///
    /// Callbacks stay registered across restarts.
    pub fn on_terminal_outcome<F>(&mut self, callback: F)
    where
        F: FnMut(Outcome) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Captures an owned copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        query::snapshot(&self.world)
    }

    /// Lifecycle state of the current session.
    #[must_use]
    pub fn state(&self) -> SessionState {
        query::state(&self.world)
    }

    /// Events produced by the most recent call that mutated the session.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Configuration the driver was created with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn run_tick(&mut self) {
        if !self.state().is_running() {
            return;
        }

        let first_event = self.events.len();
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: self.config.tick_interval(),
            },
            &mut self.events,
        );

        let view = &self.world;
        self.wander.handle(
            &self.events[first_event..],
            query::enemies(view),
            |cell| query::is_walkable(view, cell),
            &mut self.rng,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        world::apply(&mut self.world, Command::EvaluateOutcome, &mut self.events);
        self.notify(first_event);
    }

    fn notify(&mut self, first_event: usize) {
        let outcome = self.events[first_event..].iter().find_map(|event| match event {
            Event::SessionEnded { outcome } => Some(*outcome),
            _ => None,
        });

        if let Some(outcome) = outcome {
            for callback in &mut self.callbacks {
                callback(outcome);
            }
        }
    }
}

impl<R> fmt::Debug for Simulation<R>
where
    R: RandomSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("state", &self.state())
            .field("tick_index", &query::tick_index(&self.world))
            .field("accumulator", &self.accumulator)
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}
