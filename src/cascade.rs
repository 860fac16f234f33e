//! Hits, detonations and the zero-count cascade.
//!
//! Everything here runs to completion before returning: a cascade started
//! by one hit fully resolves, and the clear check runs once it has settled.

use tracing::{debug, trace};

use crate::cell::HitPower;
use crate::events::FieldEvent;
use crate::field::Field;
use crate::types::Pos;

/// What a hit did to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target was off the grid, flagged or already detonated.
    Ignored,
    /// Sensors broke but some remain.
    Absorbed { remaining: u32 },
    /// Safe cell detonated; `cleared` once every safe cell has.
    Revealed { cleared: bool },
    /// A mine went off.
    Fatal,
}

/// Result of striking a single cell, before any cascade.
enum Strike {
    Ignored,
    Absorbed(u32),
    Safe,
    Fatal,
}

impl Field {
    /// Hit the cell at `pos` with `power`.
    ///
    /// When the last sensor of a safe cell breaks, zero-count cells hit all
    /// of their neighbors with full power and the same flags, depth first.
    /// `send_callback` gates `Detonated` events for safe cells; mines always
    /// report. `allow_loot` lets detonated cells drop their loot.
    pub fn trigger_hit(&mut self, pos: Pos, power: HitPower, send_callback: bool, allow_loot: bool) -> HitOutcome {
        match self.strike(pos, power, send_callback, allow_loot) {
            Strike::Ignored => HitOutcome::Ignored,
            Strike::Absorbed(remaining) => HitOutcome::Absorbed { remaining },
            Strike::Fatal => HitOutcome::Fatal,
            Strike::Safe => {
                self.cascade_from(pos, send_callback, allow_loot);
                HitOutcome::Revealed {
                    cleared: self.settle(),
                }
            }
        }
    }

    /// Hit every undetonated, unflagged neighbor of a fulfilled indicator.
    ///
    /// Does nothing unless `pos` is a revealed cell whose flagged neighbors
    /// match its count. Returns one outcome per target, in neighbor order.
    pub fn fire_at_fulfilled(&mut self, pos: Pos, power: HitPower) -> Vec<(Pos, HitOutcome)> {
        let revealed = self.get(pos).is_some_and(|c| c.revealed);
        if !revealed || !self.is_indication_fulfilled(pos) {
            return Vec::new();
        }

        let targets: Vec<Pos> = self
            .neighbors(pos)
            .iter()
            .copied()
            .filter(|&n| {
                let cell = &self.cells[self.neighbors.index(n)];
                !cell.detonated && !cell.is_flagged()
            })
            .collect();

        trace!(row = pos.row, col = pos.col, targets = targets.len(), "firing at fulfilled indicator");
        targets
            .into_iter()
            .map(|n| (n, self.trigger_hit(n, power, true, true)))
            .collect()
    }

    /// Depth-first flood from a freshly revealed cell.
    ///
    /// Positions are struck when popped, so each branch is fully explored
    /// before its next sibling, and a cell reached twice is ignored the
    /// second time.
    fn cascade_from(&mut self, origin: Pos, send_callback: bool, allow_loot: bool) {
        let mut stack: Vec<Pos> = Vec::new();
        self.push_if_zero(origin, &mut stack);

        let mut revealed = 0usize;
        while let Some(pos) = stack.pop() {
            if let Strike::Safe = self.strike(pos, HitPower::FULL, send_callback, allow_loot) {
                revealed += 1;
                self.push_if_zero(pos, &mut stack);
            }
        }

        if revealed > 0 {
            trace!(row = origin.row, col = origin.col, revealed, "cascade settled");
        }
    }

    fn push_if_zero(&self, pos: Pos, stack: &mut Vec<Pos>) {
        if self.get(pos).is_some_and(|c| c.neighbor_mine_count == 0) {
            stack.extend(self.neighbors(pos).iter().rev());
        }
    }

    fn strike(&mut self, pos: Pos, power: HitPower, send_callback: bool, allow_loot: bool) -> Strike {
        let Some(idx) = self.index_of(pos) else {
            return Strike::Ignored;
        };
        let cell = &mut self.cells[idx];
        if cell.detonated || cell.is_flagged() {
            return Strike::Ignored;
        }

        let Some(hit) = cell.apply_hit(power, &mut self.rng) else {
            return Strike::Ignored;
        };
        if hit.broken > 0 {
            self.outbox.push(FieldEvent::SensorsBroken {
                pos,
                broken: hit.broken,
                remaining: hit.remaining,
            });
        }
        if !hit.all_broken {
            return Strike::Absorbed(hit.remaining);
        }

        self.outbox.push(FieldEvent::AllSensorsBroken { pos });
        cell.detonated = true;

        if cell.is_mined {
            cell.active = false;
            self.lost = true;
            self.outbox.push(FieldEvent::Detonated { pos, fatal: true });
            debug!(row = pos.row, col = pos.col, "mine detonated");
            return Strike::Fatal;
        }

        cell.revealed = true;
        if allow_loot && cell.loot > 0 {
            let amount = std::mem::take(&mut cell.loot);
            self.loot_collected += amount;
            self.outbox.push(FieldEvent::LootDropped { pos, amount });
        }
        if send_callback {
            self.outbox.push(FieldEvent::Detonated { pos, fatal: false });
        }

        for &n in self.neighbors.get(pos).unwrap_or(&[]) {
            let neighbor = &mut self.cells[n.row * self.neighbors.cols + n.col];
            if !neighbor.detonated {
                neighbor.active = true;
            }
        }

        Strike::Safe
    }

    /// Run the clear check after a cascade. Emits `Cleared` the first time.
    fn settle(&mut self) -> bool {
        if !self.cleared && self.is_clear() {
            self.cleared = true;
            self.outbox.push(FieldEvent::Cleared);
            debug!("field cleared");
        }
        self.cleared
    }
}
