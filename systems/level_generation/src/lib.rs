#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level generator producing the initial grid and rosters of a session.
//!
//! Border cells and interior cells with two even coordinates become solid
//! walls. The remaining open cells, minus the safe zone around the player
//! start, are shuffled and consumed in order: one per ally, a
//! density-determined prefix as soft blocks (each possibly hiding a
//! power-up), then one per enemy. Running out of candidates simply skips the
//! remaining placements.

use log::debug;
use nen_blaster_core::{
    shuffle, Ally, AllyId, CellCoord, Direction, Enemy, EnemyId, GameConfig, LevelLayout,
    PowerUp, PowerUpKind, RandomSource, TileGrid, TileKind, SAFE_ZONE,
};

const INITIAL_FACING: Direction = Direction::East;

/// Configuration parameters required to construct the level generator.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    columns: u32,
    rows: u32,
    soft_block_density: f64,
    power_up_chance: f64,
    ally_names: Vec<String>,
    enemy_names: Vec<String>,
    enemy_count: usize,
}

impl Config {
    /// Creates a new configuration with explicit generation parameters.
    ///
    /// Grids below 4x4 are accepted but leave no open safe zone: border
    /// walls always win over the player start area.
    #[must_use]
    pub fn new(
        columns: u32,
        rows: u32,
        soft_block_density: f64,
        power_up_chance: f64,
        ally_names: Vec<String>,
        enemy_names: Vec<String>,
        enemy_count: usize,
    ) -> Self {
        Self {
            columns,
            rows,
            soft_block_density,
            power_up_chance,
            ally_names,
            enemy_names,
            enemy_count,
        }
    }
}

impl From<&GameConfig> for Config {
    fn from(config: &GameConfig) -> Self {
        Self::new(
            config.columns,
            config.rows,
            config.soft_block_density,
            config.power_up_chance,
            config.ally_names.clone(),
            config.enemy_names.clone(),
            config.enemy_count,
        )
    }
}

/// Pure system that lays out a level from a random source.
#[derive(Clone, Debug)]
pub struct LevelGeneration {
    config: Config,
}

impl LevelGeneration {
    /// Creates a new level generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generates a fresh level, drawing every random choice from `rng`.
    pub fn generate<R>(&self, rng: &mut R) -> LevelLayout
    where
        R: RandomSource + ?Sized,
    {
        let (mut grid, mut candidates) = self.carve_walls();
        shuffle(&mut candidates, rng);

        let allies = self.place_allies(&mut candidates);
        let power_ups = self.place_soft_blocks(&mut grid, &mut candidates, rng);
        let enemies = self.place_enemies(&candidates, rng);

        debug!(
            "generated {}x{} level with {} allies, {} enemies and {} hidden power-ups",
            grid.columns(),
            grid.rows(),
            allies.len(),
            enemies.len(),
            power_ups.len()
        );

        LevelLayout {
            grid,
            power_ups,
            enemies,
            allies,
        }
    }

    fn carve_walls(&self) -> (TileGrid, Vec<CellCoord>) {
        let columns = self.config.columns;
        let rows = self.config.rows;
        let mut grid = TileGrid::filled(columns, rows, TileKind::Empty);
        let mut candidates = Vec::new();

        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                if is_solid_wall(cell, columns, rows) {
                    let _ = grid.set_tile(cell, TileKind::SolidWall);
                } else if !SAFE_ZONE.contains(&cell) {
                    candidates.push(cell);
                }
            }
        }

        (grid, candidates)
    }

    fn place_allies(&self, candidates: &mut Vec<CellCoord>) -> Vec<Ally> {
        let mut allies = Vec::with_capacity(self.config.ally_names.len());
        for name in &self.config.ally_names {
            let Some(cell) = candidates.pop() else {
                break;
            };
            allies.push(Ally {
                id: AllyId::new(allies.len() as u32),
                name: name.clone(),
                cell,
            });
        }
        allies
    }

    fn place_soft_blocks<R>(
        &self,
        grid: &mut TileGrid,
        candidates: &mut Vec<CellCoord>,
        rng: &mut R,
    ) -> Vec<PowerUp>
    where
        R: RandomSource + ?Sized,
    {
        let soft_block_count = soft_block_count(candidates.len(), self.config.soft_block_density);
        let mut power_ups = Vec::new();

        for cell in candidates.drain(..soft_block_count) {
            let _ = grid.set_tile(cell, TileKind::SoftBlock);
            if rng.chance(self.config.power_up_chance) {
                let kind = PowerUpKind::ALL[rng.next_below(PowerUpKind::ALL.len())];
                power_ups.push(PowerUp { cell, kind });
            }
        }

        power_ups
    }

    fn place_enemies<R>(&self, candidates: &[CellCoord], rng: &mut R) -> Vec<Enemy>
    where
        R: RandomSource + ?Sized,
    {
        let mut pool = self.config.enemy_names.clone();
        shuffle(&mut pool, rng);

        candidates
            .iter()
            .take(self.config.enemy_count)
            .enumerate()
            .map(|(index, cell)| Enemy {
                id: EnemyId::new(index as u32),
                name: enemy_name(&pool, index),
                cell: *cell,
                facing: INITIAL_FACING,
            })
            .collect()
    }
}

fn is_solid_wall(cell: CellCoord, columns: u32, rows: u32) -> bool {
    let column = cell.column();
    let row = cell.row();
    column == 0
        || row == 0
        || column + 1 == columns
        || row + 1 == rows
        || (column % 2 == 0 && row % 2 == 0)
}

fn soft_block_count(available: usize, density: f64) -> usize {
    let density = density.clamp(0.0, 1.0);
    let count = (available as f64 * density).floor() as usize;
    count.min(available)
}

fn enemy_name(pool: &[String], index: usize) -> String {
    if pool.is_empty() {
        return format!("Trouper {index}");
    }
    pool[index % pool.len()].clone()
}
