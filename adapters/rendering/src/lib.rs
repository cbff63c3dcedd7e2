#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text presentation of Nen Blaster sessions.
//!
//! Everything here is stateless: frames are rebuilt from a
//! [`SessionSnapshot`] every time and never feed back into the simulation.

use std::{fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use nen_blaster_core::{CellCoord, Outcome, PowerUpKind, SessionSnapshot, TileKind, TITLE_BANNER};

const ANSI_CLEAR: &str = "\x1b[2J\x1b[H";

/// Screens of the navigation shell around a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Title screen shown before the first session.
    Start,
    /// A session is running.
    Playing,
    /// A session reached its terminal outcome.
    End(Outcome),
}

impl Screen {
    /// Renders the screen, drawing the session when one is being played.
    #[must_use]
    pub fn frame(self, snapshot: &SessionSnapshot) -> Frame {
        match self {
            Self::Start => render_start(),
            Self::Playing => render_playing(snapshot),
            Self::End(outcome) => render_end(outcome),
        }
    }
}

/// Fully composed block of text ready to be presented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
}

impl Frame {
    fn push<T>(&mut self, line: T)
    where
        T: Into<String>,
    {
        self.lines.push(line.into());
    }

    /// Lines composing the frame, top to bottom.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

/// Draws the HUD and the grid of a running session.
///
/// Each cell shows its topmost occupant, layered as explosion, player,
/// enemy, ally, bomb, revealed power-up and finally the tile itself.
#[must_use]
pub fn render_playing(snapshot: &SessionSnapshot) -> Frame {
    let mut frame = Frame::default();
    frame.push(hud_line(snapshot));

    let grid = &snapshot.grid;
    for row in 0..grid.rows() {
        let line: String = (0..grid.columns())
            .map(|column| glyph_at(snapshot, CellCoord::new(column, row)))
            .collect();
        frame.push(line);
    }

    frame
}

/// Draws the title screen with the controls legend.
#[must_use]
pub fn render_start() -> Frame {
    let mut frame = Frame::default();
    frame.push(format!("Welcome to {TITLE_BANNER}"));
    frame.push("");
    frame.push("Pass the secret Hunter Exam phase! Defeat the Phantom Troupe with your");
    frame.push("Jajanken. Break blocks to find Nen enhancements and clear your path.");
    frame.push("");
    frame.push("Controls:");
    frame.push("  w a s d / k h j l : move");
    frame.push("  space / b         : use Jajanken (place bomb)");
    frame.push("  .                 : wait");
    frame
}

/// Draws the result screen for a finished session.
#[must_use]
pub fn render_end(outcome: Outcome) -> Frame {
    let (headline, detail) = match outcome {
        Outcome::Victory => ("You Passed!", "You defeated all targets. Welcome, Hunter!"),
        Outcome::Defeat => (
            "You Failed...",
            "You were eliminated. Try again to get your license!",
        ),
    };

    let mut frame = Frame::default();
    frame.push(headline);
    frame.push(detail);
    frame
}

fn hud_line(snapshot: &SessionSnapshot) -> String {
    format!(
        "Troupers Left: {} | Jajanken: {} | Aura: {}",
        snapshot.enemies.len(),
        snapshot.player.bomb_capacity,
        snapshot.player.blast_radius
    )
}

fn glyph_at(snapshot: &SessionSnapshot, cell: CellCoord) -> char {
    if snapshot.is_hot(cell) {
        return '*';
    }
    if snapshot.player.cell == cell {
        return '@';
    }
    if let Some(enemy) = snapshot.enemies.iter().find(|enemy| enemy.cell == cell) {
        return enemy
            .name
            .chars()
            .next()
            .map_or('E', |initial| initial.to_ascii_uppercase());
    }
    if snapshot.allies.iter().any(|ally| ally.cell == cell) {
        return '&';
    }
    if snapshot.bombs.iter().any(|bomb| bomb.cell == cell) {
        return 'o';
    }
    if let Some(power_up) = snapshot.revealed_power_up_at(cell) {
        return match power_up.kind {
            PowerUpKind::BombCapacityUp => 'b',
            PowerUpKind::BlastRadiusUp => 'f',
            PowerUpKind::SpeedUp => 's',
        };
    }

    match snapshot.grid.tile(cell) {
        Some(TileKind::SolidWall) => '#',
        Some(TileKind::SoftBlock) => '%',
        Some(TileKind::Empty) | None => '.',
    }
}

/// Rendering backend capable of presenting Nen Blaster frames.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;
}

/// Backend writing frames as plain text.
#[derive(Debug)]
pub struct TextBackend<W>
where
    W: Write,
{
    writer: W,
    clear_screen: bool,
}

impl<W> TextBackend<W>
where
    W: Write,
{
    /// Creates a backend writing to the provided sink.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            clear_screen: false,
        }
    }

    /// Configures whether the terminal is cleared before every frame.
    #[must_use]
    pub fn with_clear_screen(mut self, enabled: bool) -> Self {
        self.clear_screen = enabled;
        self
    }

    /// Consumes the backend, yielding the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> RenderingBackend for TextBackend<W>
where
    W: Write,
{
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        if self.clear_screen {
            self.writer
                .write_all(ANSI_CLEAR.as_bytes())
                .context("failed to clear the terminal")?;
        }
        writeln!(self.writer, "{frame}").context("failed to write frame")?;
        self.writer.flush().context("failed to flush frame")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use nen_blaster_core::{
        Ally, AllyId, Bomb, BombId, Direction, Enemy, EnemyId, Explosion, Player, PowerUp,
        SessionState, TileGrid, PLAYER_START,
    };

    fn snapshot() -> SessionSnapshot {
        let mut grid = TileGrid::filled(5, 5, TileKind::Empty);
        for row in 0..5 {
            for column in 0..5 {
                let border = column == 0 || row == 0 || column == 4 || row == 4;
                if border || (column % 2 == 0 && row % 2 == 0) {
                    assert!(grid.set_tile(CellCoord::new(column, row), TileKind::SolidWall));
                }
            }
        }
        assert!(grid.set_tile(CellCoord::new(3, 3), TileKind::SoftBlock));

        SessionSnapshot {
            state: SessionState::Running,
            tick_index: 0,
            grid,
            player: Player {
                cell: PLAYER_START,
                bomb_capacity: 2,
                blast_radius: 3,
                speed: 1,
            },
            enemies: vec![Enemy {
                id: EnemyId::new(0),
                name: "hisoka".to_owned(),
                cell: CellCoord::new(3, 1),
                facing: Direction::East,
            }],
            allies: vec![Ally {
                id: AllyId::new(0),
                name: "Killua".to_owned(),
                cell: CellCoord::new(1, 3),
            }],
            bombs: vec![Bomb {
                id: BombId::new(0),
                cell: CellCoord::new(2, 1),
                fuse_remaining: Duration::from_secs(1),
                blast_radius: 1,
            }],
            explosions: Vec::new(),
            power_ups: vec![
                PowerUp {
                    cell: CellCoord::new(3, 2),
                    kind: PowerUpKind::BlastRadiusUp,
                },
                PowerUp {
                    cell: CellCoord::new(3, 3),
                    kind: PowerUpKind::BombCapacityUp,
                },
            ],
        }
    }

    #[test]
    fn playing_frame_draws_hud_and_layers() {
        let frame = render_playing(&snapshot());

        assert_eq!(
            frame.lines(),
            &[
                "Troupers Left: 1 | Jajanken: 2 | Aura: 3",
                "#####",
                "#@oH#",
                "#.#f#",
                "#&.%#",
                "#####",
            ]
        );
    }

    #[test]
    fn explosions_cover_every_other_layer() {
        let mut snapshot = snapshot();
        snapshot.explosions.push(Explosion {
            id: BombId::new(0),
            cells: vec![PLAYER_START, CellCoord::new(3, 1)],
            remaining: Duration::from_millis(100),
        });

        let frame = render_playing(&snapshot);

        assert_eq!(frame.lines()[2], "#*o*#");
    }

    #[test]
    fn screens_dispatch_to_their_renderers() {
        let snapshot = snapshot();
        assert_eq!(Screen::Start.frame(&snapshot), render_start());
        assert_eq!(Screen::Playing.frame(&snapshot), render_playing(&snapshot));
        assert_eq!(
            Screen::End(Outcome::Victory).frame(&snapshot).lines()[0],
            "You Passed!"
        );
        assert!(render_start().lines()[0].contains(TITLE_BANNER));
    }

    #[test]
    fn text_backend_writes_frames_line_by_line() {
        let mut backend = TextBackend::new(Vec::new());

        backend
            .present(&render_end(Outcome::Defeat))
            .expect("writing to memory succeeds");

        let written = String::from_utf8(backend.into_inner()).expect("utf-8 output");
        assert_eq!(
            written,
            "You Failed...\nYou were eliminated. Try again to get your license!\n"
        );
    }

    #[test]
    fn clear_screen_prefixes_the_escape_sequence() {
        let mut backend = TextBackend::new(Vec::new()).with_clear_screen(true);

        backend.present(&Frame::default()).expect("in-memory write");

        let written = backend.into_inner();
        assert!(written.starts_with(ANSI_CLEAR.as_bytes()));
    }
}
