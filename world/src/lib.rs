#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Nen Blaster.
//!
//! The world is mutated exclusively through [`apply`]. Every command other
//! than [`Command::LoadLevel`] is ignored unless the session is running, so a
//! terminal outcome freezes the state until the next level is loaded.

mod arsenal;
mod outcome;

use std::time::Duration;

use log::trace;
use nen_blaster_core::{
    is_walkable, Ally, BombRejection, CellCoord, Command, Direction, Enemy, EnemyId, Event,
    GameConfig, LevelLayout, Player, PowerUp, SessionState, TileGrid, TileKind, PLAYER_START,
};

use crate::arsenal::Arsenal;

/// Timings and starting stats fixed for the lifetime of the world.
#[derive(Clone, Copy, Debug)]
struct Rules {
    bomb_fuse: Duration,
    explosion_duration: Duration,
    initial_player: Player,
}

impl Rules {
    fn from_config(config: &GameConfig) -> Self {
        Self {
            bomb_fuse: config.bomb_fuse(),
            explosion_duration: config.explosion_duration(),
            initial_player: Player {
                cell: PLAYER_START,
                bomb_capacity: config.initial_bomb_capacity,
                blast_radius: config.initial_blast_radius,
                speed: config.initial_speed,
            },
        }
    }
}

/// Represents the authoritative Nen Blaster session state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    state: SessionState,
    grid: TileGrid,
    player: Player,
    enemies: Vec<Enemy>,
    allies: Vec<Ally>,
    power_ups: Vec<PowerUp>,
    arsenal: Arsenal,
    tick_index: u64,
}

impl World {
    /// Creates a world awaiting its first level.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let rules = Rules::from_config(config);
        Self {
            rules,
            state: SessionState::Initializing,
            grid: TileGrid::filled(config.columns, config.rows, TileKind::SolidWall),
            player: rules.initial_player,
            enemies: Vec::new(),
            allies: Vec::new(),
            power_ups: Vec::new(),
            arsenal: Arsenal::new(),
            tick_index: 0,
        }
    }

    fn load_level(&mut self, level: LevelLayout, out_events: &mut Vec<Event>) {
        let LevelLayout {
            grid,
            power_ups,
            mut enemies,
            mut allies,
        } = level;
        enemies.sort_by_key(|enemy| enemy.id);
        allies.sort_by_key(|ally| ally.id);

        self.grid = grid;
        self.power_ups = power_ups;
        self.enemies = enemies;
        self.allies = allies;
        self.player = self.rules.initial_player;
        self.arsenal = Arsenal::new();
        self.tick_index = 0;
        self.state = SessionState::Running;

        out_events.push(Event::SessionStarted {
            enemies: self.enemies.len(),
            allies: self.allies.len(),
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        self.arsenal.countdown(dt);
        self.arsenal
            .ignite(&mut self.grid, self.rules.explosion_duration, out_events);
        self.arsenal.age(dt, out_events);
    }

    fn walkable(&self, cell: CellCoord) -> bool {
        is_walkable(cell, &self.grid, self.arsenal.bombs(), &self.allies)
    }

    fn step_enemy(&mut self, enemy: EnemyId, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(index) = self.enemies.iter().position(|candidate| candidate.id == enemy) else {
            return;
        };

        let from = self.enemies[index].cell;
        let Some(to) = self.grid.neighbor(from, direction) else {
            trace!("enemy {} blocked by grid edge", enemy.get());
            return;
        };
        if !self.walkable(to) {
            trace!("enemy {} blocked at {:?}", enemy.get(), to);
            return;
        }

        let moving = &mut self.enemies[index];
        moving.cell = to;
        moving.facing = direction;
        out_events.push(Event::EnemyMoved {
            enemy,
            from,
            to,
            facing: direction,
        });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.player.cell;
        let Some(to) = self
            .grid
            .neighbor(from, direction)
            .filter(|next| self.walkable(*next))
        else {
            trace!("player move {direction:?} from {from:?} rejected");
            return;
        };

        self.player.cell = to;
        out_events.push(Event::PlayerMoved { from, to });
    }

    fn place_bomb(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.player.cell;
        let armed = u32::try_from(self.arsenal.bombs().len()).unwrap_or(u32::MAX);

        let rejection = if armed >= self.player.bomb_capacity {
            Some(BombRejection::AtCapacity)
        } else if self.arsenal.occupied(cell) {
            Some(BombRejection::CellOccupied)
        } else {
            None
        };

        if let Some(reason) = rejection {
            trace!("bomb placement at {cell:?} rejected: {reason:?}");
            out_events.push(Event::BombPlacementRejected { cell, reason });
            return;
        }

        let blast_radius = self.player.blast_radius;
        let bomb = self.arsenal.arm(cell, self.rules.bomb_fuse, blast_radius);
        out_events.push(Event::BombPlaced {
            bomb,
            cell,
            blast_radius,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Command::LoadLevel { level } = command {
        world.load_level(level, out_events);
        return;
    }

    if !world.state.is_running() {
        return;
    }

    match command {
        Command::LoadLevel { .. } => {}
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::StepEnemy { enemy, direction } => world.step_enemy(enemy, direction, out_events),
        Command::EvaluateOutcome => world.evaluate_outcome(out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::PlaceBomb => world.place_bomb(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use nen_blaster_core::{
        Ally, Bomb, CellCoord, Enemy, Explosion, Player, PowerUp, SessionSnapshot, SessionState,
        TileGrid,
    };

    use super::World;

    /// Lifecycle state of the current session.
    #[must_use]
    pub fn state(world: &World) -> SessionState {
        world.state
    }

    /// Number of ticks processed since the level was loaded.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Current player state.
    #[must_use]
    pub fn player(world: &World) -> Player {
        world.player
    }

    /// Remaining enemies ordered by identifier.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Allies ordered by identifier.
    #[must_use]
    pub fn allies(world: &World) -> &[Ally] {
        &world.allies
    }

    /// Armed bombs ordered by identifier.
    #[must_use]
    pub fn bombs(world: &World) -> &[Bomb] {
        world.arsenal.bombs()
    }

    /// Live explosions ordered by identifier.
    #[must_use]
    pub fn explosions(world: &World) -> &[Explosion] {
        world.arsenal.explosions()
    }

    /// Uncollected power-ups, including those still hidden under soft blocks.
    #[must_use]
    pub fn power_ups(world: &World) -> &[PowerUp] {
        &world.power_ups
    }

    /// Reports whether an agent may currently enter the cell.
    #[must_use]
    pub fn is_walkable(world: &World, cell: CellCoord) -> bool {
        world.walkable(cell)
    }

    /// Reports whether a live explosion covers the cell.
    #[must_use]
    pub fn is_hot(world: &World, cell: CellCoord) -> bool {
        world.arsenal.is_hot(cell)
    }

    /// Captures an owned copy of the full session state.
    #[must_use]
    pub fn snapshot(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            state: world.state,
            tick_index: world.tick_index,
            grid: world.grid.clone(),
            player: world.player,
            enemies: world.enemies.clone(),
            allies: world.allies.clone(),
            bombs: world.arsenal.bombs().to_vec(),
            explosions: world.arsenal.explosions().to_vec(),
            power_ups: world.power_ups.clone(),
        }
    }
}
