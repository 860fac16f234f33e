//! Fatality estimate: how likely an undetonated cell is to be a mine.
//!
//! Cheap local heuristic, not a constraint solve. The estimate is the
//! maximum of
//! - a baseline `1 / flags available`, and
//! - for each revealed numbered neighbor, its unflagged remaining mines
//!   divided by its undetonated, unflagged cells.
//!
//! The max rule overestimates where constraints overlap.

use crate::field::Field;
use crate::types::Pos;

/// Local constraint of one revealed indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndicatorConstraint {
    pub count: u8,
    pub flagged: usize,
    /// Undetonated, unflagged cells around the indicator.
    pub empty: usize,
}

impl IndicatorConstraint {
    /// `(count - flagged) / empty`, or `None` without empty cells.
    pub fn ratio(&self) -> Option<f32> {
        if self.empty == 0 {
            return None;
        }
        Some((self.count as f32 - self.flagged as f32) / self.empty as f32)
    }
}

/// Combine the baseline and the local ratios with the max rule.
pub fn combine(available_flags: u32, constraints: impl IntoIterator<Item = IndicatorConstraint>) -> f32 {
    let baseline = (available_flags >= 1).then(|| 1.0 / available_flags as f32);

    baseline
        .into_iter()
        .chain(constraints.into_iter().filter_map(|c| c.ratio()))
        .fold(0.0f32, f32::max)
        .clamp(0.0, 1.0)
}

impl Field {
    /// Estimate for `pos`; `None` when detonated or off the grid.
    pub fn fatality_chance(&self, pos: Pos) -> Option<f32> {
        let cell = self.get(pos)?;
        if cell.detonated {
            return None;
        }

        let constraints: Vec<IndicatorConstraint> = self
            .neighbors(pos)
            .iter()
            .filter_map(|&n| self.indicator_constraint(n))
            .collect();

        Some(combine(self.budget.available(), constraints))
    }

    /// Row-major estimates for the whole board, `0.0` for detonated cells.
    pub fn fatality_map(&self) -> Vec<f32> {
        self.cells
            .iter()
            .map(|c| self.fatality_chance(c.pos).unwrap_or(0.0))
            .collect()
    }

    /// Constraint of a revealed, numbered cell; `None` for anything else.
    pub fn indicator_constraint(&self, pos: Pos) -> Option<IndicatorConstraint> {
        let cell = self.get(pos)?;
        if !cell.detonated || cell.is_mined || cell.neighbor_mine_count == 0 {
            return None;
        }

        let mut flagged = 0;
        let mut empty = 0;
        for &n in self.neighbors(pos) {
            let around = &self.cells[self.neighbors.index(n)];
            if around.is_flagged() {
                flagged += 1;
            } else if !around.detonated {
                empty += 1;
            }
        }

        Some(IndicatorConstraint {
            count: cell.neighbor_mine_count,
            flagged,
            empty,
        })
    }
}
