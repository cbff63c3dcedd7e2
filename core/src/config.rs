//! Load-time tuning shared by every crate in the workspace.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Cell occupied by the player when a session starts.
pub const PLAYER_START: CellCoord = CellCoord::new(1, 1);

/// Cells around the player start that level generation always leaves open.
pub const SAFE_ZONE: [CellCoord; 3] = [
    PLAYER_START,
    CellCoord::new(2, 1),
    CellCoord::new(1, 2),
];

const MINIMUM_GRID_EDGE: u32 = 4;

/// Fixed configuration constants for a game.
///
/// Every field has a default matching the reference build, so configuration
/// files only need to list the values they override. Durations are expressed
/// in whole milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of tile columns in the grid.
    pub columns: u32,
    /// Number of tile rows in the grid.
    pub rows: u32,
    /// Simulated time advanced by every tick.
    pub tick_interval_ms: u64,
    /// Time between placing a bomb and its detonation.
    pub bomb_fuse_ms: u64,
    /// Time an explosion stays lethal after detonation.
    pub explosion_duration_ms: u64,
    /// Minimum simulated time between two enemy movement passes.
    pub enemy_move_interval_ms: u64,
    /// Number of bombs the player may arm at once when a session starts.
    pub initial_bomb_capacity: u32,
    /// Blast radius of the player's bombs when a session starts.
    pub initial_blast_radius: u32,
    /// Reserved movement speed attribute.
    pub initial_speed: u32,
    /// Number of enemies placed by level generation.
    pub enemy_count: usize,
    /// Fraction of open candidate cells converted into soft blocks.
    pub soft_block_density: f64,
    /// Probability that a soft block hides a power-up.
    pub power_up_chance: f64,
    /// Ally roster; one ally is placed per name.
    pub ally_names: Vec<String>,
    /// Pool of enemy names, cycled when smaller than `enemy_count`.
    pub enemy_names: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: 15,
            rows: 13,
            tick_interval_ms: 100,
            bomb_fuse_ms: 3_000,
            explosion_duration_ms: 500,
            enemy_move_interval_ms: 500,
            initial_bomb_capacity: 1,
            initial_blast_radius: 1,
            initial_speed: 1,
            enemy_count: 4,
            soft_block_density: 0.6,
            power_up_chance: 0.3,
            ally_names: names(&["Killua", "Kurapika", "Senritsu"]),
            enemy_names: names(&["Hisoka", "Chrollo", "Machi", "Feitan", "Phinks"]),
        }
    }
}

impl GameConfig {
    /// Checks that the configuration describes a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < MINIMUM_GRID_EDGE || self.rows < MINIMUM_GRID_EDGE {
            return Err(ConfigError::GridTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }

        check_probability("soft_block_density", self.soft_block_density)?;
        check_probability("power_up_chance", self.power_up_chance)?;

        if self.enemy_count > 0 && self.enemy_names.is_empty() {
            return Err(ConfigError::EmptyEnemyPool {
                count: self.enemy_count,
            });
        }

        Ok(())
    }

    /// Simulated time advanced by every tick.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Time between placing a bomb and its detonation.
    #[must_use]
    pub const fn bomb_fuse(&self) -> Duration {
        Duration::from_millis(self.bomb_fuse_ms)
    }

    /// Time an explosion stays lethal after detonation.
    #[must_use]
    pub const fn explosion_duration(&self) -> Duration {
        Duration::from_millis(self.explosion_duration_ms)
    }

    /// Minimum simulated time between two enemy movement passes.
    #[must_use]
    pub const fn enemy_move_interval(&self) -> Duration {
        Duration::from_millis(self.enemy_move_interval_ms)
    }
}

/// Reasons a [`GameConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid cannot hold the border walls and the safe zone.
    #[error("grid of {columns}x{rows} tiles is smaller than the 4x4 minimum")]
    GridTooSmall {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The tick interval was zero, so simulated time would never advance.
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    /// A probability lies outside the closed unit interval.
    #[error("{name} must lie within 0.0..=1.0, got {value}")]
    ProbabilityOutOfRange {
        /// Name of the offending field.
        name: &'static str,
        /// Configured value.
        value: f64,
    },
    /// Enemies were requested without any names to give them.
    #[error("enemy name pool is empty but {count} enemies were requested")]
    EmptyEnemyPool {
        /// Requested enemy count.
        count: usize,
    },
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    #[test]
    fn defaults_match_reference_build() {
        let config = GameConfig::default();
        assert_eq!((config.columns, config.rows), (15, 13));
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.bomb_fuse(), Duration::from_secs(3));
        assert_eq!(config.explosion_duration(), Duration::from_millis(500));
        assert_eq!(config.enemy_move_interval(), Duration::from_millis(500));
        assert_eq!(config.enemy_count, 4);
        assert_eq!(config.enemy_names.len(), 5);
        assert_eq!(config.ally_names.len(), 3);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn tiny_grids_are_rejected() {
        let config = GameConfig {
            columns: 3,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooSmall {
                columns: 3,
                rows: 13
            })
        );
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let config = GameConfig {
            tick_interval_ms: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickInterval));
    }

    #[test]
    fn probabilities_must_lie_in_unit_interval() {
        let config = GameConfig {
            power_up_chance: 1.5,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "power_up_chance",
                value: 1.5
            })
        );

        let config = GameConfig {
            soft_block_density: f64::NAN,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                name: "soft_block_density",
                ..
            })
        ));
    }

    #[test]
    fn enemies_require_a_name_pool() {
        let config = GameConfig {
            enemy_names: Vec::new(),
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyEnemyPool { count: 4 })
        );

        let config = GameConfig {
            enemy_names: Vec::new(),
            enemy_count: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn safe_zone_surrounds_player_start() {
        assert_eq!(SAFE_ZONE[0], PLAYER_START);
        assert_eq!(PLAYER_START.step(Direction::East), Some(SAFE_ZONE[1]));
        assert_eq!(PLAYER_START.step(Direction::South), Some(SAFE_ZONE[2]));
    }
}
