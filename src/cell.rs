//! One grid cell and its multi-hit sensor model.

use serde::{Deserialize, Serialize};

use crate::rng::FieldRng;
use crate::types::{Pos, SelectionState};

/// Result of breaking sensors on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorBreak {
    pub broken: u32,
    pub remaining: u32,
    /// True only for the call that broke the last sensor.
    pub all_broken: bool,
}

/// How hard a hit strikes a cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HitPower {
    /// Absolute number of sensors.
    Sensors(u32),
    /// Fraction of the cell's total sensors, in [0, 1].
    Fraction(f32),
}

impl HitPower {
    /// Breaks every remaining sensor.
    pub const FULL: HitPower = HitPower::Fraction(1.0);
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub pos: Pos,
    pub is_mined: bool,
    /// Mined neighbors (0-8). Left at 0 on mined cells.
    pub neighbor_mine_count: u8,
    pub detonated: bool,
    pub revealed: bool,
    /// Set once a neighbor has detonated non-fatally.
    pub active: bool,
    pub loot: u32,
    pub selection: SelectionState,
    /// `true` = intact.
    sensors: Vec<bool>,
    sensors_remaining: u32,
}

impl Cell {
    pub fn new(pos: Pos, sensors_total: u32) -> Self {
        Self {
            pos,
            is_mined: false,
            neighbor_mine_count: 0,
            detonated: false,
            revealed: false,
            active: false,
            loot: 0,
            selection: SelectionState::Default,
            sensors: vec![true; sensors_total as usize],
            sensors_remaining: sensors_total,
        }
    }

    #[inline]
    pub fn sensors_total(&self) -> u32 {
        self.sensors.len() as u32
    }

    #[inline]
    pub fn sensors_remaining(&self) -> u32 {
        self.sensors_remaining
    }

    #[inline]
    pub fn is_flagged(&self) -> bool {
        self.selection.is_flagged()
    }

    /// Which sensors are still intact, in sensor order.
    #[cfg(test)]
    pub(crate) fn intact_sensors(&self) -> &[bool] {
        &self.sensors
    }

    /// Break `min(amount, remaining)` sensors chosen uniformly among the
    /// intact ones. Returns `None` when nothing was left to break.
    pub fn break_sensors(&mut self, amount: u32, rng: &mut FieldRng) -> Option<SensorBreak> {
        if self.sensors_remaining == 0 {
            return None;
        }

        let mut intact: Vec<usize> = self
            .sensors
            .iter()
            .enumerate()
            .filter(|&(_, &ok)| ok)
            .map(|(i, _)| i)
            .collect();

        let to_break = amount.min(self.sensors_remaining);
        for _ in 0..to_break {
            if let Some(i) = rng.take_from(&mut intact) {
                self.sensors[i] = false;
            }
        }
        self.sensors_remaining -= to_break;

        Some(SensorBreak {
            broken: to_break,
            remaining: self.sensors_remaining,
            all_broken: to_break > 0 && self.sensors_remaining == 0,
        })
    }

    /// Break a fraction of the total sensors. Any positive fraction breaks
    /// at least one sensor.
    pub fn break_sensors_fraction(&mut self, fraction: f32, rng: &mut FieldRng) -> Option<SensorBreak> {
        let amount = fraction_to_amount(fraction, self.sensors_total());
        self.break_sensors(amount, rng)
    }

    pub fn apply_hit(&mut self, power: HitPower, rng: &mut FieldRng) -> Option<SensorBreak> {
        match power {
            HitPower::Sensors(n) => self.break_sensors(n, rng),
            HitPower::Fraction(f) => self.break_sensors_fraction(f, rng),
        }
    }
}

fn fraction_to_amount(fraction: f32, total: u32) -> u32 {
    if !fraction.is_finite() || fraction <= 0.0 {
        return 0;
    }
    (fraction.min(1.0) * total as f32).ceil() as u32
}
