//! Armed bombs and live explosions owned by the world.

use std::time::Duration;

use log::debug;
use nen_blaster_core::{Bomb, BombId, CellCoord, Event, Explosion, TileGrid};
use nen_blaster_system_detonation::detonate;

/// Registry that stores bombs, their explosions and manages identifier allocation.
///
/// Both lists stay ordered by identifier because identifiers are allocated
/// monotonically and entries are only ever appended or removed.
#[derive(Debug)]
pub(crate) struct Arsenal {
    bombs: Vec<Bomb>,
    explosions: Vec<Explosion>,
    next_bomb_id: BombId,
}

impl Arsenal {
    /// Creates an empty arsenal with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            bombs: Vec::new(),
            explosions: Vec::new(),
            next_bomb_id: BombId::new(0),
        }
    }

    pub(crate) fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub(crate) fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub(crate) fn occupied(&self, cell: CellCoord) -> bool {
        self.bombs.iter().any(|bomb| bomb.cell == cell)
    }

    /// Arms a new bomb and returns its identifier.
    pub(crate) fn arm(&mut self, cell: CellCoord, fuse: Duration, blast_radius: u32) -> BombId {
        let id = self.next_bomb_id;
        self.next_bomb_id = BombId::new(id.get().saturating_add(1));
        self.bombs.push(Bomb {
            id,
            cell,
            fuse_remaining: fuse,
            blast_radius,
        });
        id
    }

    /// Burns every fuse down by `dt`.
    pub(crate) fn countdown(&mut self, dt: Duration) {
        for bomb in &mut self.bombs {
            bomb.fuse_remaining = bomb.fuse_remaining.saturating_sub(dt);
        }
    }

    /// Detonates every bomb whose fuse ran out, in identifier order.
    ///
    /// Each blast walks the grid as left by the previous one. Bombs covered by
    /// another blast keep their own fuse.
    pub(crate) fn ignite(
        &mut self,
        grid: &mut TileGrid,
        explosion_duration: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let (expired, armed): (Vec<Bomb>, Vec<Bomb>) = self
            .bombs
            .drain(..)
            .partition(|bomb| bomb.fuse_remaining.is_zero());
        self.bombs = armed;

        for bomb in expired {
            let blast = detonate(grid, bomb.cell, bomb.blast_radius);
            debug!(
                "bomb {} detonated at {:?}: {} cells, {} blocks destroyed",
                bomb.id.get(),
                bomb.cell,
                blast.cells().len(),
                blast.destroyed().len()
            );

            let destroyed = blast.destroyed().to_vec();
            let cells = blast.into_cells();
            out_events.push(Event::BombDetonated {
                bomb: bomb.id,
                cells: cells.clone(),
            });
            for cell in destroyed {
                out_events.push(Event::BlockDestroyed { cell });
            }

            self.explosions.push(Explosion {
                id: bomb.id,
                cells,
                remaining: explosion_duration,
            });
        }
    }

    /// Ages explosions by `dt`, discarding the ones that burned out.
    pub(crate) fn age(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.explosions.retain_mut(|explosion| {
            explosion.remaining = explosion.remaining.saturating_sub(dt);
            if explosion.remaining.is_zero() {
                out_events.push(Event::ExplosionExpired {
                    explosion: explosion.id,
                });
                false
            } else {
                true
            }
        });
    }

    /// Returns the first live explosion covering the cell.
    pub(crate) fn explosion_covering(&self, cell: CellCoord) -> Option<BombId> {
        self.explosions
            .iter()
            .find(|explosion| explosion.is_hot_at(cell))
            .map(|explosion| explosion.id)
    }

    pub(crate) fn is_hot(&self, cell: CellCoord) -> bool {
        self.explosion_covering(cell).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nen_blaster_core::TileKind;

    const FUSE: Duration = Duration::from_millis(300);
    const EXPLOSION: Duration = Duration::from_millis(200);
    const TICK: Duration = Duration::from_millis(100);

    fn open_grid() -> TileGrid {
        let mut grid = TileGrid::filled(5, 5, TileKind::Empty);
        for row in 0..5 {
            for column in 0..5 {
                if column == 0 || row == 0 || column == 4 || row == 4 {
                    assert!(grid.set_tile(CellCoord::new(column, row), TileKind::SolidWall));
                }
            }
        }
        grid
    }

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut arsenal = Arsenal::new();
        let first = arsenal.arm(CellCoord::new(1, 1), FUSE, 1);
        let second = arsenal.arm(CellCoord::new(2, 1), FUSE, 2);

        assert_eq!(first, BombId::new(0));
        assert_eq!(second, BombId::new(1));
        assert!(arsenal.occupied(CellCoord::new(2, 1)));
        assert!(!arsenal.occupied(CellCoord::new(3, 1)));
    }

    #[test]
    fn bombs_detonate_once_their_fuse_is_spent() {
        let mut arsenal = Arsenal::new();
        let mut grid = open_grid();
        let mut events = Vec::new();
        let _ = arsenal.arm(CellCoord::new(1, 1), FUSE, 1);

        for _ in 0..2 {
            arsenal.countdown(TICK);
            arsenal.ignite(&mut grid, EXPLOSION, &mut events);
        }
        assert!(events.is_empty());
        assert_eq!(arsenal.bombs().len(), 1);

        arsenal.countdown(TICK);
        arsenal.ignite(&mut grid, EXPLOSION, &mut events);

        assert!(arsenal.bombs().is_empty());
        assert_eq!(arsenal.explosions().len(), 1);
        assert!(arsenal.is_hot(CellCoord::new(2, 1)));
        assert_eq!(
            events,
            vec![Event::BombDetonated {
                bomb: BombId::new(0),
                cells: vec![
                    CellCoord::new(1, 1),
                    CellCoord::new(1, 2),
                    CellCoord::new(2, 1),
                ],
            }]
        );
    }

    #[test]
    fn explosions_expire_after_their_duration() {
        let mut arsenal = Arsenal::new();
        let mut grid = open_grid();
        let mut events = Vec::new();
        let _ = arsenal.arm(CellCoord::new(2, 2), Duration::ZERO, 1);
        arsenal.ignite(&mut grid, EXPLOSION, &mut events);
        events.clear();

        arsenal.age(TICK, &mut events);
        assert!(events.is_empty());
        assert_eq!(arsenal.explosion_covering(CellCoord::new(2, 2)), Some(BombId::new(0)));

        arsenal.age(TICK, &mut events);
        assert_eq!(
            events,
            vec![Event::ExplosionExpired {
                explosion: BombId::new(0)
            }]
        );
        assert!(arsenal.explosions().is_empty());
        assert!(!arsenal.is_hot(CellCoord::new(2, 2)));
    }
}
