//! Field construction: mine placement, number calculation, safe start and
//! loot layout.
//!
//! `build_field()` runs the whole sequence once per phase.

use tracing::debug;

use crate::cell::HitPower;
use crate::config::FieldConfig;
use crate::field::Field;
use crate::loot;
use crate::rng::FieldRng;
use crate::types::{NeighborCache, Pos};

/// Place exactly `mine_count` mines among `total` cells.
///
/// Draws distinct indices by picking-and-removing from a pool of the
/// remaining indices, so no cell is chosen twice. `mine_count` is clamped
/// to `total`.
pub fn place_mines(total: usize, mine_count: usize, rng: &mut FieldRng) -> Vec<bool> {
    let mut mines = vec![false; total];
    let mut pool: Vec<usize> = (0..total).collect();

    for _ in 0..mine_count.min(total) {
        if let Some(i) = rng.take_from(&mut pool) {
            mines[i] = true;
        }
    }

    mines
}

/// Neighbor mine counts for all non-mine cells.
///
/// Mine cells keep 0. Off-grid neighbors never enter the count.
pub fn calculate_numbers(mines: &[bool], neighbor_cache: &NeighborCache) -> Vec<u8> {
    let mut counts = vec![0u8; mines.len()];

    for (i, count) in counts.iter_mut().enumerate() {
        if mines[i] {
            continue;
        }
        let pos = neighbor_cache.pos(i);
        *count = neighbor_cache
            .get(pos)
            .unwrap_or(&[])
            .iter()
            .filter(|&&n| mines[neighbor_cache.index(n)])
            .count() as u8;
    }

    counts
}

/// Build, seed and loot a field from `config`.
pub fn build_field(config: &FieldConfig, mut rng: FieldRng) -> Field {
    let total = config.rows * config.cols;
    let mines = place_mines(total, config.mine_count(), &mut rng);

    let mut field = Field::from_mines(config.rows, config.cols, &mines, config.sensors_per_cell, rng);
    debug!(
        rows = config.rows,
        cols = config.cols,
        mines = field.mine_count(),
        "field laid out"
    );

    if let Some(start) = field.pick_safe_start() {
        field.safe_start = Some(start);
        field.trigger_hit(start, HitPower::FULL, false, false);
        debug!(row = start.row, col = start.col, "safe start revealed");
    }

    field.distribute_loot(config.reward_total, config.loot_chance);
    field
}

impl Field {
    /// A uniformly random zero-count safe cell, falling back to any safe
    /// cell. `None` when every cell is mined.
    pub fn pick_safe_start(&mut self) -> Option<Pos> {
        let safe: Vec<Pos> = self
            .cells
            .iter()
            .filter(|c| !c.is_mined)
            .map(|c| c.pos)
            .collect();
        let zeros: Vec<Pos> = safe
            .iter()
            .copied()
            .filter(|&p| self.cells[self.neighbors.index(p)].neighbor_mine_count == 0)
            .collect();

        if zeros.is_empty() {
            debug!("no zero cell, falling back to any safe cell");
            self.rng.choose(&safe).copied()
        } else {
            self.rng.choose(&zeros).copied()
        }
    }

    /// Spread `reward` over the undetonated safe cells that qualify for loot.
    pub(crate) fn distribute_loot(&mut self, reward: u32, chance: f64) {
        let candidates: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_mined && !c.detonated)
            .map(|(i, _)| i)
            .collect();

        let qualifying = loot::roll_qualifying(&candidates, chance, &mut self.rng);
        let amounts = loot::distribute(reward, qualifying.len(), &mut self.rng);

        for (&i, &amount) in qualifying.iter().zip(&amounts) {
            self.cells[i].loot = amount;
        }
        self.reward_total = amounts.iter().sum();
        debug!(cells = qualifying.len(), total = self.reward_total, "loot distributed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FieldEvent;

    fn config(rows: usize, cols: usize, mine_percent: f64) -> FieldConfig {
        FieldConfig {
            rows,
            cols,
            mine_percent,
            ..FieldConfig::default()
        }
    }

    #[test]
    fn test_place_mines_count() {
        let mut rng = FieldRng::from_seed(42);
        let mines = place_mines(30 * 16, 99, &mut rng);
        assert_eq!(mines.iter().filter(|&&m| m).count(), 99);
    }

    #[test]
    fn test_place_mines_clamped_to_total() {
        let mut rng = FieldRng::from_seed(42);
        let mines = place_mines(9, 20, &mut rng);
        assert!(mines.iter().all(|&m| m));
    }

    #[test]
    fn test_calculate_numbers_simple() {
        let nc = NeighborCache::new(3, 3);
        let mut mines = vec![false; 9];
        mines[nc.index(Pos::new(1, 1))] = true;

        let counts = calculate_numbers(&mines, &nc);

        for i in 0..9 {
            if i == nc.index(Pos::new(1, 1)) {
                assert_eq!(counts[i], 0);
            } else {
                assert_eq!(counts[i], 1);
            }
        }
    }

    #[test]
    fn test_neighbor_counts_match_mines_on_random_boards() {
        for seed in 0..20 {
            let field = build_field(&config(7, 11, 0.2), FieldRng::from_seed(seed));
            let mined = field.cells().iter().filter(|c| c.is_mined).count();
            assert_eq!(field.mine_count(), mined);
            assert_eq!(field.budget().max_flags() as usize, mined);

            for cell in field.cells().iter().filter(|c| !c.is_mined) {
                let expected = field
                    .neighbors(cell.pos)
                    .iter()
                    .filter(|&&n| field.get(n).unwrap().is_mined)
                    .count();
                assert_eq!(cell.neighbor_mine_count as usize, expected);
            }
        }
    }

    #[test]
    fn test_mine_free_board_clears_on_start() {
        let mut field = build_field(&config(5, 5, 0.0), FieldRng::from_seed(1));
        assert!(field.cells().iter().all(|c| c.detonated && c.revealed));
        assert!(field.is_clear());

        let events = field.drain_events();
        let broken = events
            .iter()
            .filter(|e| matches!(e, FieldEvent::AllSensorsBroken { .. }))
            .count();
        assert_eq!(broken, 25);
        // The safe start never reports detonations upward.
        assert!(!events.iter().any(|e| matches!(e, FieldEvent::Detonated { .. })));
    }

    #[test]
    fn test_safe_start_prefers_zero_cells() {
        for seed in 0..10 {
            let field = build_field(&config(8, 8, 0.1), FieldRng::from_seed(seed));
            let start = field.safe_start().unwrap();
            let cell = field.get(start).unwrap();
            assert!(!cell.is_mined);
            let zero_exists = field
                .cells()
                .iter()
                .any(|c| !c.is_mined && c.neighbor_mine_count == 0);
            if zero_exists {
                assert_eq!(cell.neighbor_mine_count, 0);
            }
        }
    }

    #[test]
    fn test_safe_start_falls_back_on_dense_board() {
        // 8 mines on 3x3 leaves one safe cell, which cannot be a zero.
        let field = build_field(&config(3, 3, 0.9), FieldRng::from_seed(4));
        let start = field.safe_start().unwrap();
        let cell = field.get(start).unwrap();
        assert!(!cell.is_mined);
        assert!(cell.detonated);
        assert!(field.is_clear());
    }

    #[test]
    fn test_fully_mined_board_has_no_start() {
        let field = build_field(&config(2, 2, 1.0), FieldRng::from_seed(4));
        assert_eq!(field.safe_start(), None);
        assert!(field.cells().iter().all(|c| !c.detonated));
        assert_eq!(field.reward_total(), 0);
    }

    #[test]
    fn test_loot_only_on_undetonated_safe_cells() {
        let cfg = FieldConfig {
            reward_total: 500,
            loot_chance: 0.5,
            ..config(12, 12, 0.2)
        };
        let field = build_field(&cfg, FieldRng::from_seed(8));
        let looted: Vec<_> = field.cells().iter().filter(|c| c.loot > 0).collect();
        assert!(!looted.is_empty());
        assert!(looted.iter().all(|c| !c.is_mined && !c.detonated));
        let sum: u32 = looted.iter().map(|c| c.loot).sum();
        assert_eq!(sum, field.reward_total());
        assert_eq!(sum, 500.max(looted.len() as u32));
    }
}
