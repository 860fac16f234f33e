//! Typed events emitted by the field and the flag budget.
//!
//! Each entity owns an [`Outbox`]; presentation drains it after a call
//! returns. Nothing here waits on the consumer.

use serde::Serialize;

use crate::types::{Pos, SelectionState};

/// Ordered queue of events owned by one entity.
#[derive(Debug)]
pub struct Outbox<T> {
    pending: Vec<T>,
}

impl<T> Outbox<T> {
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, event: T) {
        self.pending.push(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.pending)
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> &[T] {
        &self.pending
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for Outbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "budget")]
pub enum BudgetEvent {
    #[serde(rename = "flagTaken")]
    FlagTaken,
    #[serde(rename = "flagReturned")]
    FlagReturned,
    #[serde(rename = "flagsAmountUpdate")]
    FlagsAmountUpdate { available: u32, max: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum FieldEvent {
    /// A committed selection transition.
    #[serde(rename = "modeApplied")]
    ModeApplied {
        pos: Pos,
        old: SelectionState,
        new: SelectionState,
    },
    #[serde(rename = "sensorsBroken")]
    SensorsBroken { pos: Pos, broken: u32, remaining: u32 },
    /// Fires once per cell lifetime.
    #[serde(rename = "allSensorsBroken")]
    AllSensorsBroken { pos: Pos },
    #[serde(rename = "detonated")]
    Detonated { pos: Pos, fatal: bool },
    #[serde(rename = "lootDropped")]
    LootDropped { pos: Pos, amount: u32 },
    #[serde(rename = "cleared")]
    Cleared,
    #[serde(rename = "budget")]
    Budget(BudgetEvent),
}
