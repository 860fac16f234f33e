//! Core data types shared by every part of the minefield.
//!
//! Grids are stored flat in row-major layout: `cells[row * cols + col]`.

use serde::{Deserialize, Serialize};

/// A grid coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[inline(always)]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Selection state of one cell: the product of a *flagged* axis and a
/// *neighbour-highlighted* axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    #[default]
    Default,
    Flagged,
    NeighbourIndication,
    FlaggedNeighbourIndication,
}

impl SelectionState {
    #[inline(always)]
    pub fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged | Self::FlaggedNeighbourIndication)
    }

    #[inline(always)]
    pub fn is_neighbour_mode(self) -> bool {
        matches!(self, Self::NeighbourIndication | Self::FlaggedNeighbourIndication)
    }

    /// Build the state from its two axes.
    pub fn from_axes(flagged: bool, neighbour: bool) -> Self {
        match (flagged, neighbour) {
            (false, false) => Self::Default,
            (true, false) => Self::Flagged,
            (false, true) => Self::NeighbourIndication,
            (true, true) => Self::FlaggedNeighbourIndication,
        }
    }

    /// Same neighbour axis, flagged axis set to `flagged`.
    pub fn with_flag(self, flagged: bool) -> Self {
        Self::from_axes(flagged, self.is_neighbour_mode())
    }

    /// Same flagged axis, neighbour axis set to `neighbour`.
    pub fn with_neighbour(self, neighbour: bool) -> Self {
        Self::from_axes(self.is_flagged(), neighbour)
    }
}

/// Pre-computed neighbor cache for all cells.
///
/// Stores the 8-directional neighbors (clipped to grid bounds) for every cell.
/// Off-grid positions never appear, so counts taken over a cached slice
/// exclude them from both numerator and denominator.
pub struct NeighborCache {
    pub rows: usize,
    pub cols: usize,
    data: Vec<Pos>,
    /// offsets[i]..offsets[i+1] is the neighbor range of cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    pub fn new(rows: usize, cols: usize) -> Self {
        let total = rows * cols;
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for row in 0..rows {
            for col in 0..cols {
                offsets.push(data.len());
                for dr in -1i64..=1 {
                    for dc in -1i64..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nr = row as i64 + dr;
                        let nc = col as i64 + dc;
                        if nr >= 0 && nr < rows as i64 && nc >= 0 && nc < cols as i64 {
                            data.push(Pos::new(nr as usize, nc as usize));
                        }
                    }
                }
            }
        }
        offsets.push(data.len()); // sentinel

        Self {
            rows,
            cols,
            data,
            offsets,
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    #[inline(always)]
    pub fn index(&self, pos: Pos) -> usize {
        pos.row * self.cols + pos.col
    }

    #[inline(always)]
    pub fn pos(&self, index: usize) -> Pos {
        Pos::new(index / self.cols, index % self.cols)
    }

    /// Neighbors of `pos`, or `None` when `pos` itself is off the grid.
    #[inline(always)]
    pub fn get(&self, pos: Pos) -> Option<&[Pos]> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.index(pos);
        Some(&self.data[self.offsets[idx]..self.offsets[idx + 1]])
    }
}
