//! Per-tick power-up pickup and terminal outcome resolution.

use log::{debug, info};
use nen_blaster_core::{Event, Hazard, Outcome, PowerUpKind, SessionState, TileKind};

use crate::World;

impl World {
    /// Runs pickup, defeat, elimination and victory checks in that order.
    pub(crate) fn evaluate_outcome(&mut self, out_events: &mut Vec<Event>) {
        self.collect_power_up(out_events);

        let player_cell = self.player.cell;
        if let Some(explosion) = self.arsenal.explosion_covering(player_cell) {
            out_events.push(Event::PlayerCaught {
                cell: player_cell,
                hazard: Hazard::Explosion(explosion),
            });
            self.end(Outcome::Defeat, out_events);
            return;
        }

        let roster_before = self.enemies.len();
        let arsenal = &self.arsenal;
        self.enemies.retain(|enemy| {
            if arsenal.is_hot(enemy.cell) {
                debug!(
                    "enemy {} ({}) eliminated at {:?}",
                    enemy.id.get(),
                    enemy.name,
                    enemy.cell
                );
                out_events.push(Event::EnemyEliminated {
                    enemy: enemy.id,
                    cell: enemy.cell,
                });
                false
            } else {
                true
            }
        });

        if roster_before > 0 && self.enemies.is_empty() {
            self.end(Outcome::Victory, out_events);
            return;
        }

        let contact = self
            .enemies
            .iter()
            .find(|enemy| enemy.cell == player_cell)
            .map(|enemy| enemy.id);
        if let Some(enemy) = contact {
            out_events.push(Event::PlayerCaught {
                cell: player_cell,
                hazard: Hazard::Enemy(enemy),
            });
            self.end(Outcome::Defeat, out_events);
        }
    }

    fn collect_power_up(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.player.cell;
        if self.grid.tile(cell) != Some(TileKind::Empty) {
            return;
        }
        let Some(index) = self
            .power_ups
            .iter()
            .position(|power_up| power_up.cell == cell)
        else {
            return;
        };

        let power_up = self.power_ups.remove(index);
        match power_up.kind {
            PowerUpKind::BombCapacityUp => {
                self.player.bomb_capacity = self.player.bomb_capacity.saturating_add(1);
            }
            PowerUpKind::BlastRadiusUp => {
                self.player.blast_radius = self.player.blast_radius.saturating_add(1);
            }
            PowerUpKind::SpeedUp => {}
        }
        debug!("collected {:?} at {:?}", power_up.kind, cell);
        out_events.push(Event::PowerUpCollected {
            cell,
            kind: power_up.kind,
        });
    }

    fn end(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        info!("session ended in {outcome:?} after {} ticks", self.tick_index);
        self.state = SessionState::Ended(outcome);
        out_events.push(Event::SessionEnded { outcome });
    }
}
