#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure blast propagation used when a bomb's fuse runs out.
//!
//! A blast always covers the bomb's own cell and then walks outward along the
//! four axes for up to `blast_radius` cells. Walls and the grid edge stop a
//! walk before the cell; a soft block is covered, cleared to
//! [`TileKind::Empty`] and stops the walk after it.
//!
//! The grid is mutated in place. When several bombs detonate in the same tick
//! and are processed one after another, later walks observe blocks cleared by
//! earlier ones.

use nen_blaster_core::{CellCoord, Direction, TileGrid, TileKind};

const BLAST_DIRECTIONS: [Direction; 4] = [
    Direction::South,
    Direction::North,
    Direction::East,
    Direction::West,
];

/// Cells covered by a single detonation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blast {
    cells: Vec<CellCoord>,
    destroyed: Vec<CellCoord>,
}

impl Blast {
    /// Every cell covered by the blast, starting with the origin.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Soft blocks cleared by the blast, in walk order.
    #[must_use]
    pub fn destroyed(&self) -> &[CellCoord] {
        &self.destroyed
    }

    /// Consumes the blast, yielding the covered cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<CellCoord> {
        self.cells
    }
}

/// Detonates a bomb at `origin`, clearing soft blocks in `grid`.
pub fn detonate(grid: &mut TileGrid, origin: CellCoord, blast_radius: u32) -> Blast {
    let mut blast = Blast {
        cells: vec![origin],
        destroyed: Vec::new(),
    };

    for direction in BLAST_DIRECTIONS {
        let mut cursor = origin;
        for _ in 0..blast_radius {
            let Some(next) = grid.neighbor(cursor, direction) else {
                break;
            };

            match grid.tile(next) {
                Some(TileKind::Empty) => {
                    blast.cells.push(next);
                    cursor = next;
                }
                Some(TileKind::SoftBlock) => {
                    blast.cells.push(next);
                    if grid.set_tile(next, TileKind::Empty) {
                        blast.destroyed.push(next);
                    }
                    break;
                }
                Some(TileKind::SolidWall) | None => break,
            }
        }
    }

    blast
}
