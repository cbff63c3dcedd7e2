#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Nen Blaster engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presenters to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

mod config;
mod random;

pub use config::{ConfigError, GameConfig, PLAYER_START, SAFE_ZONE};
pub use random::{shuffle, RandomSource, SeededRandom};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Title shown by adapters when the experience boots.
pub const TITLE_BANNER: &str = "Nen Blaster!";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the session with a freshly generated level and starts it.
    LoadLevel {
        /// Layout produced by the level generator.
        level: LevelLayout,
    },
    /// Advances bomb fuses, detonates expired bombs and ages explosions.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an enemy advance a single step in the specified direction.
    StepEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Resolves power-up pickup and terminal outcomes for the current tick.
    EvaluateOutcome,
    /// Requests that the player advance a single step in the specified direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a bomb be armed on the player's current cell.
    PlaceBomb,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new session began from a loaded level.
    SessionStarted {
        /// Number of enemies placed by the level.
        enemies: usize,
        /// Number of allies placed by the level.
        allies: usize,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Confirms that a bomb was armed.
    BombPlaced {
        /// Identifier allocated to the bomb.
        bomb: BombId,
        /// Cell holding the bomb.
        cell: CellCoord,
        /// Blast radius captured at placement time.
        blast_radius: u32,
    },
    /// Reports that a bomb placement request was rejected.
    BombPlacementRejected {
        /// Cell on which the placement was attempted.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: BombRejection,
    },
    /// Confirms that a bomb detonated and produced an explosion.
    BombDetonated {
        /// Identifier of the bomb, reused by the resulting explosion.
        bomb: BombId,
        /// Cells covered by the explosion.
        cells: Vec<CellCoord>,
    },
    /// Confirms that a soft block was destroyed by a blast.
    BlockDestroyed {
        /// Cell that became empty.
        cell: CellCoord,
    },
    /// Announces that an explosion burned out and no longer affects its cells.
    ExplosionExpired {
        /// Identifier of the expired explosion.
        explosion: BombId,
    },
    /// Confirms that an enemy moved between two cells.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Cell the enemy occupied before moving.
        from: CellCoord,
        /// Cell the enemy occupies after moving.
        to: CellCoord,
        /// Facing adopted by the enemy.
        facing: Direction,
    },
    /// Confirms that the player collected a power-up.
    PowerUpCollected {
        /// Cell that held the power-up.
        cell: CellCoord,
        /// Kind of power-up collected.
        kind: PowerUpKind,
    },
    /// Confirms that an enemy was caught in an explosion and removed.
    EnemyEliminated {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
        /// Cell the enemy occupied when it was caught.
        cell: CellCoord,
    },
    /// Reports that the player was caught by a hazard.
    PlayerCaught {
        /// Cell the player occupied when caught.
        cell: CellCoord,
        /// Hazard responsible for the defeat.
        hazard: Hazard,
    },
    /// Announces the terminal outcome of the session.
    SessionEnded {
        /// Result of the session.
        outcome: Outcome,
    },
}

/// Cardinal movement directions available to agents and blasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in the order enemies enumerate their candidate moves.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Column and row offsets of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the adjacent cell in the provided direction.
    ///
    /// `None` is returned when the step would leave the non-negative
    /// coordinate space. Upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (column_offset, row_offset) = direction.offset();
        let column = self.column.checked_add_signed(column_offset)?;
        let row = self.row.checked_add_signed(row_offset)?;
        Some(Self::new(column, row))
    }
}

/// Classification of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open ground that agents may traverse.
    Empty,
    /// Indestructible wall that stops movement and blasts.
    SolidWall,
    /// Destructible block that stops movement until a blast clears it.
    SoftBlock,
}

/// Dense row-major grid of tile kinds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    cells: Vec<TileKind>,
}

impl TileGrid {
    /// Creates a grid with every cell set to the provided kind.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, kind: TileKind) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![kind; capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Returns the kind of the provided cell, or `None` when out of bounds.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the kind of the provided cell.
    ///
    /// Returns `false` without mutating anything when the cell is out of bounds.
    pub fn set_tile(&mut self, cell: CellCoord, kind: TileKind) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        match self.cells.get_mut(index) {
            Some(slot) => {
                *slot = kind;
                true
            }
            None => false,
        }
    }

    /// Returns the in-bounds neighbour of a cell in the provided direction.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|next| self.contains(*next))
    }

    /// Iterator over every cell and its kind in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, TileKind)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *kind)
        })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an ally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllyId(u32);

impl AllyId {
    /// Creates a new ally identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bomb and to the explosion it becomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BombId(u32);

impl BombId {
    /// Creates a new bomb identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// The single player-controlled agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    /// Cell currently occupied by the player.
    pub cell: CellCoord,
    /// Maximum number of bombs the player may have armed at once.
    pub bomb_capacity: u32,
    /// Blast radius captured by bombs placed from now on.
    pub blast_radius: u32,
    /// Movement speed in tiles per input. Reserved; movement is one tile per intent.
    pub speed: u32,
}

/// Roaming hostile agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Display name drawn from the enemy name pool.
    pub name: String,
    /// Cell currently occupied by the enemy.
    pub cell: CellCoord,
    /// Direction of the enemy's most recent step.
    pub facing: Direction,
}

/// Static non-combatant that blocks movement and ignores blasts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ally {
    /// Unique identifier assigned to the ally.
    pub id: AllyId,
    /// Display name drawn from the ally roster.
    pub name: String,
    /// Cell occupied by the ally for the whole session.
    pub cell: CellCoord,
}

/// Armed bomb waiting for its fuse to burn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bomb {
    /// Identifier allocated by the world.
    pub id: BombId,
    /// Cell holding the bomb.
    pub cell: CellCoord,
    /// Time left before detonation.
    pub fuse_remaining: Duration,
    /// Blast radius captured from the player when the bomb was placed.
    pub blast_radius: u32,
}

/// Transient blast left behind by a detonated bomb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Explosion {
    /// Identifier of the originating bomb.
    pub id: BombId,
    /// Cells covered by the blast, fixed at detonation time.
    pub cells: Vec<CellCoord>,
    /// Time left before the explosion burns out.
    pub remaining: Duration,
}

impl Explosion {
    /// Reports whether the explosion still affects the provided cell.
    #[must_use]
    pub fn is_hot_at(&self, cell: CellCoord) -> bool {
        !self.remaining.is_zero() && self.cells.contains(&cell)
    }
}

/// Kinds of power-ups hidden beneath soft blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Raises the number of bombs the player may arm at once.
    BombCapacityUp,
    /// Raises the blast radius of bombs placed afterwards.
    BlastRadiusUp,
    /// Reserved speed upgrade without a gameplay effect.
    SpeedUp,
}

impl PowerUpKind {
    /// Every power-up kind, in the order the level generator draws from.
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::BombCapacityUp,
        PowerUpKind::BlastRadiusUp,
        PowerUpKind::SpeedUp,
    ];
}

/// Collectible upgrade revealed once its covering soft block is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUp {
    /// Cell holding the power-up.
    pub cell: CellCoord,
    /// Effect applied on pickup.
    pub kind: PowerUpKind,
}

/// Initial state produced by the level generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    /// Tile grid including walls and soft blocks.
    pub grid: TileGrid,
    /// Power-ups hidden under soft blocks.
    pub power_ups: Vec<PowerUp>,
    /// Enemy roster with starting cells.
    pub enemies: Vec<Enemy>,
    /// Ally roster with their fixed cells.
    pub allies: Vec<Ally>,
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every enemy was eliminated.
    Victory,
    /// The player was caught by an explosion or an enemy.
    Defeat,
}

/// Lifecycle of a single session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No level has been loaded yet.
    Initializing,
    /// The session accepts ticks and player actions.
    Running,
    /// The session reached a terminal outcome and no longer mutates.
    Ended(Outcome),
}

impl SessionState {
    /// Reports whether the session currently accepts mutations.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns the terminal outcome once the session ended.
    #[must_use]
    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Ended(outcome) => Some(outcome),
            Self::Initializing | Self::Running => None,
        }
    }
}

/// Hazard responsible for catching the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hazard {
    /// The player stood inside an active explosion.
    Explosion(BombId),
    /// The player shared a cell with an enemy.
    Enemy(EnemyId),
}

/// Reasons a bomb placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BombRejection {
    /// The player already has as many bombs armed as their capacity allows.
    AtCapacity,
    /// A bomb already occupies the player's cell.
    CellOccupied,
}

/// Reports whether an agent may enter the provided cell.
///
/// Cells outside the grid, walls, soft blocks, armed bombs and allies all
/// block movement. Enemies and the player never block; contact between them
/// is resolved by outcome evaluation.
#[must_use]
pub fn is_walkable(cell: CellCoord, grid: &TileGrid, bombs: &[Bomb], allies: &[Ally]) -> bool {
    match grid.tile(cell) {
        Some(TileKind::Empty) => {}
        Some(TileKind::SolidWall | TileKind::SoftBlock) | None => return false,
    }

    if bombs.iter().any(|bomb| bomb.cell == cell) {
        return false;
    }

    !allies.iter().any(|ally| ally.cell == cell)
}

/// Read-only copy of the full session state handed to presenters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Lifecycle state of the session.
    pub state: SessionState,
    /// Number of ticks processed since the level was loaded.
    pub tick_index: u64,
    /// Current tile grid.
    pub grid: TileGrid,
    /// Player state.
    pub player: Player,
    /// Remaining enemies ordered by identifier.
    pub enemies: Vec<Enemy>,
    /// Allies ordered by identifier.
    pub allies: Vec<Ally>,
    /// Armed bombs ordered by identifier.
    pub bombs: Vec<Bomb>,
    /// Active explosions ordered by identifier.
    pub explosions: Vec<Explosion>,
    /// Uncollected power-ups, revealed or not.
    pub power_ups: Vec<PowerUp>,
}

impl SessionSnapshot {
    /// Reports whether any active explosion covers the provided cell.
    #[must_use]
    pub fn is_hot(&self, cell: CellCoord) -> bool {
        self.explosions
            .iter()
            .any(|explosion| explosion.is_hot_at(cell))
    }

    /// Returns the power-up at the cell when it has been revealed.
    #[must_use]
    pub fn revealed_power_up_at(&self, cell: CellCoord) -> Option<PowerUp> {
        if self.grid.tile(cell) != Some(TileKind::Empty) {
            return None;
        }
        self.power_ups
            .iter()
            .copied()
            .find(|power_up| power_up.cell == cell)
    }

    /// Reports whether an agent may enter the provided cell.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        is_walkable(cell, &self.grid, &self.bombs, &self.allies)
    }
}
