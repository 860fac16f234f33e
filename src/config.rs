//! Field parameters supplied by the phase sequencer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::HitPower;

/// Upper bound on `sensors_per_cell`.
pub const MAX_SENSORS_PER_CELL: u32 = 64;

/// Absorbs float error in `mine_percent * cells` before flooring.
const MINE_COUNT_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("field must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("field of {rows}x{cols} cells does not fit in memory")]
    TooLarge { rows: usize, cols: usize },
    #[error("mine percent must be a finite number (got {0})")]
    MinePercent(f64),
    #[error("cells need at least one sensor")]
    NoSensors,
    #[error("cells carry at most {max} sensors (got {0})", max = MAX_SENSORS_PER_CELL)]
    TooManySensors(u32),
    #[error("hit power must be positive (got {0:?})")]
    HitPower(HitPower),
    #[error("loot chance must lie in [0, 1] (got {0})")]
    LootChance(f64),
}

/// Numeric parameters of one field.
///
/// `mine_percent` is a fraction: `0.15` mines 15% of the cells. Values
/// outside [0, 1] are clamped when mines are placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    pub rows: usize,
    pub cols: usize,
    pub mine_percent: f64,
    pub reward_total: u32,
    pub sensors_per_cell: u32,
    /// Power of one primary-fire hit.
    pub hit_power: HitPower,
    /// Chance that an unrevealed safe cell carries loot.
    pub loot_chance: f64,
    /// Fixed seed for deterministic fields.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            rows: 9,
            cols: 9,
            mine_percent: 0.15,
            reward_total: 100,
            sensors_per_cell: 3,
            hit_power: HitPower::Sensors(1),
            loot_chance: 0.25,
            seed: None,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.rows.checked_mul(self.cols).is_none() {
            return Err(ConfigError::TooLarge {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !self.mine_percent.is_finite() {
            return Err(ConfigError::MinePercent(self.mine_percent));
        }
        if self.sensors_per_cell == 0 {
            return Err(ConfigError::NoSensors);
        }
        if self.sensors_per_cell > MAX_SENSORS_PER_CELL {
            return Err(ConfigError::TooManySensors(self.sensors_per_cell));
        }
        let powered = match self.hit_power {
            HitPower::Sensors(n) => n > 0,
            HitPower::Fraction(f) => f.is_finite() && f > 0.0,
        };
        if !powered {
            return Err(ConfigError::HitPower(self.hit_power));
        }
        if !(0.0..=1.0).contains(&self.loot_chance) {
            return Err(ConfigError::LootChance(self.loot_chance));
        }
        Ok(())
    }

    /// `floor(mine_percent * rows * cols)`, clamped to the cell count.
    ///
    /// A tiny epsilon is added before flooring so that products like
    /// `0.29 * 100 = 28.999...` land on the intended count.
    pub fn mine_count(&self) -> usize {
        let total = self.rows * self.cols;
        let raw = (self.mine_percent * total as f64 + MINE_COUNT_EPSILON).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(total)
        }
    }
}
