//! Loading of the optional TOML game configuration.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use nen_blaster_core::GameConfig;

/// Reads the configuration at `path`, or the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse(contents: &str) -> Result<GameConfig> {
    let config: GameConfig =
        toml::from_str(contents).context("failed to parse configuration toml contents")?;
    config.validate()?;
    Ok(config)
}
