//! Key-to-intent mapping for scripted and interactive play.

use nen_blaster_core::Direction;

/// Action requested by a single key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Intent {
    /// Step the player one cell.
    Move(Direction),
    /// Arm a bomb on the player's cell.
    PlaceBomb,
    /// Let a tick pass without acting.
    Wait,
}

/// Maps a key to its intent; unknown keys map to `None`.
pub(crate) fn intent_for_key(key: char) -> Option<Intent> {
    let intent = match key.to_ascii_lowercase() {
        'w' | 'k' => Intent::Move(Direction::North),
        'a' | 'h' => Intent::Move(Direction::West),
        's' | 'j' => Intent::Move(Direction::South),
        'd' | 'l' => Intent::Move(Direction::East),
        ' ' | 'b' => Intent::PlaceBomb,
        '.' => Intent::Wait,
        _ => return None,
    };
    Some(intent)
}

/// Converts a key script into intents, skipping characters without a binding.
pub(crate) fn parse_script(script: &str) -> Vec<Intent> {
    script.chars().filter_map(intent_for_key).collect()
}
