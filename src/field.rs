//! The dense minefield grid and its read-only queries.
//!
//! Mutating operations live next to the component they belong to:
//! flags in `selection`, hits and cascades in `cascade`, estimates in
//! `estimator`, layout in `board`.

use serde::Serialize;

use crate::budget::FlagBudget;
use crate::cell::Cell;
use crate::events::{FieldEvent, Outbox};
use crate::rng::FieldRng;
use crate::types::{NeighborCache, Pos, SelectionState};

pub struct Field {
    pub(crate) cells: Vec<Cell>,
    pub(crate) neighbors: NeighborCache,
    pub(crate) budget: FlagBudget,
    pub(crate) outbox: Outbox<FieldEvent>,
    pub(crate) rng: FieldRng,
    pub(crate) mine_count: usize,
    pub(crate) reward_total: u32,
    pub(crate) loot_collected: u32,
    pub(crate) safe_start: Option<Pos>,
    pub(crate) lost: bool,
    pub(crate) cleared: bool,
}

impl Field {
    /// Lay out cells from a row-major mine mask and compute neighbor counts.
    ///
    /// The flag budget starts full at the mine count. No cell is detonated.
    pub fn from_mines(
        rows: usize,
        cols: usize,
        mines: &[bool],
        sensors_per_cell: u32,
        rng: FieldRng,
    ) -> Self {
        debug_assert_eq!(mines.len(), rows * cols);
        let neighbors = NeighborCache::new(rows, cols);
        let counts = crate::board::calculate_numbers(mines, &neighbors);

        let cells: Vec<Cell> = (0..rows * cols)
            .map(|i| {
                let mut cell = Cell::new(neighbors.pos(i), sensors_per_cell);
                cell.is_mined = mines[i];
                cell.neighbor_mine_count = counts[i];
                cell
            })
            .collect();

        let mine_count = mines.iter().filter(|&&m| m).count();

        Self {
            cells,
            neighbors,
            budget: FlagBudget::new(mine_count as u32),
            outbox: Outbox::new(),
            rng,
            mine_count,
            reward_total: 0,
            loot_collected: 0,
            safe_start: None,
            lost: false,
            cleared: false,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.neighbors.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.neighbors.cols
    }

    #[inline]
    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    /// Total loot distributed over the field.
    #[inline]
    pub fn reward_total(&self) -> u32 {
        self.reward_total
    }

    #[inline]
    pub fn loot_collected(&self) -> u32 {
        self.loot_collected
    }

    #[inline]
    pub fn safe_start(&self) -> Option<Pos> {
        self.safe_start
    }

    #[inline]
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn budget(&self) -> &FlagBudget {
        &self.budget
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at `pos`, or `None` off the grid.
    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        self.index_of(pos).map(|i| &self.cells[i])
    }

    /// In-bounds 8-neighbors of `pos`; empty when `pos` is off the grid.
    pub fn neighbors(&self, pos: Pos) -> &[Pos] {
        self.neighbors.get(pos).unwrap_or(&[])
    }

    #[inline]
    pub(crate) fn index_of(&self, pos: Pos) -> Option<usize> {
        self.neighbors
            .in_bounds(pos)
            .then(|| self.neighbors.index(pos))
    }

    /// Flagged cells around `pos`.
    pub fn flagged_around(&self, pos: Pos) -> usize {
        self.neighbors(pos)
            .iter()
            .filter(|&&n| self.cells[self.neighbors.index(n)].is_flagged())
            .count()
    }

    /// True iff every non-mined cell has detonated.
    pub fn is_clear(&self) -> bool {
        self.cells.iter().all(|c| c.is_mined || c.detonated)
    }

    /// True iff the cell's mine count equals its flagged neighbors.
    pub fn is_indication_fulfilled(&self, pos: Pos) -> bool {
        match self.get(pos) {
            Some(cell) => cell.neighbor_mine_count as usize == self.flagged_around(pos),
            None => false,
        }
    }

    /// Events raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<FieldEvent> {
        self.outbox.drain()
    }

    /// Move budget events into the field's outbox so presentation reads one stream.
    pub(crate) fn forward_budget_events(&mut self) {
        for event in self.budget.drain_events() {
            self.outbox.push(FieldEvent::Budget(event));
        }
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            rows: self.rows(),
            cols: self.cols(),
            mine_count: self.mine_count,
            flags_available: self.budget.available(),
            max_flags: self.budget.max_flags(),
            loot_collected: self.loot_collected,
            cleared: self.cleared,
            lost: self.lost,
            cells: self.cells.iter().map(CellView::from).collect(),
        }
    }
}

/// What presentation may see of a cell. Mines stay hidden until they explode.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CellState {
    Hidden,
    Revealed { adjacent: u8 },
    Exploded,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub pos: Pos,
    #[serde(flatten)]
    pub state: CellState,
    pub selection: SelectionState,
    pub sensors_remaining: u32,
    pub active: bool,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        let state = match (cell.detonated, cell.is_mined) {
            (false, _) => CellState::Hidden,
            (true, true) => CellState::Exploded,
            (true, false) => CellState::Revealed {
                adjacent: cell.neighbor_mine_count,
            },
        };
        Self {
            pos: cell.pos,
            state,
            selection: cell.selection,
            sensors_remaining: cell.sensors_remaining(),
            active: cell.active,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub mine_count: usize,
    pub flags_available: u32,
    pub max_flags: u32,
    pub loot_collected: u32,
    pub cleared: bool,
    pub lost: bool,
    /// Row-major.
    pub cells: Vec<CellView>,
}
