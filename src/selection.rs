//! Per-cell flag / neighbour-highlight state machine.
//!
//! The flagged axis only moves when the field's [`FlagBudget`] agrees; the
//! neighbour axis is free.
//!
//! [`FlagBudget`]: crate::budget::FlagBudget

use tracing::trace;

use crate::events::FieldEvent;
use crate::field::Field;
use crate::types::{Pos, SelectionState};

impl Field {
    /// Set the flagged axis of `pos`. Returns whether a transition was
    /// committed.
    ///
    /// Flagging takes a flag from the budget, unflagging returns one; the
    /// state only changes if that call succeeds. Detonated cells cannot be
    /// flagged.
    pub fn apply_flag(&mut self, pos: Pos, flag: bool) -> bool {
        let Some(idx) = self.index_of(pos) else {
            return false;
        };
        let cell = &self.cells[idx];
        if cell.detonated || cell.selection.is_flagged() == flag {
            return false;
        }

        let granted = if flag {
            self.budget.take_flag()
        } else {
            self.budget.return_flag()
        };
        self.forward_budget_events();
        if !granted {
            trace!(row = pos.row, col = pos.col, flag, "flag refused by budget");
            return false;
        }

        let old = self.cells[idx].selection;
        self.commit_selection(idx, old.with_flag(flag));
        true
    }

    pub fn toggle_flag(&mut self, pos: Pos) -> bool {
        let Some(flagged) = self.get(pos).map(|c| c.is_flagged()) else {
            return false;
        };
        self.apply_flag(pos, !flagged)
    }

    /// Set the neighbour axis of `pos`, keeping its flag.
    ///
    /// Detonated cells cannot be highlighted, but a highlight that outlived
    /// a detonation can always be cleared.
    pub fn select_as_neighbour(&mut self, pos: Pos, on: bool) -> bool {
        let Some(idx) = self.index_of(pos) else {
            return false;
        };
        let cell = &self.cells[idx];
        if (on && cell.detonated) || cell.selection.is_neighbour_mode() == on {
            return false;
        }
        let new = cell.selection.with_neighbour(on);
        self.commit_selection(idx, new);
        true
    }

    /// Highlight (or clear) every neighbor of the indicator at `pos`.
    pub fn highlight_neighbours(&mut self, pos: Pos, on: bool) {
        let around: Vec<Pos> = self.neighbors(pos).to_vec();
        for n in around {
            self.select_as_neighbour(n, on);
        }
    }

    fn commit_selection(&mut self, idx: usize, new: SelectionState) {
        let cell = &mut self.cells[idx];
        let old = cell.selection;
        cell.selection = new;
        self.outbox.push(FieldEvent::ModeApplied {
            pos: cell.pos,
            old,
            new,
        });
    }
}
