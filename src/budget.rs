//! Shared flag budget: how many cells may be flagged at once.

use tracing::trace;

use crate::events::{BudgetEvent, Outbox};

/// Bounded flag counter. `0 <= available <= max_flags` always holds;
/// `max_flags` is fixed at construction.
#[derive(Debug)]
pub struct FlagBudget {
    max_flags: u32,
    available: u32,
    outbox: Outbox<BudgetEvent>,
}

impl FlagBudget {
    /// A full budget of `max_flags`.
    pub fn new(max_flags: u32) -> Self {
        Self::with_available(max_flags, max_flags)
    }

    /// A budget with `available` flags left, clamped to `max_flags`.
    pub fn with_available(max_flags: u32, available: u32) -> Self {
        Self {
            max_flags,
            available: available.min(max_flags),
            outbox: Outbox::new(),
        }
    }

    #[inline]
    pub fn max_flags(&self) -> u32 {
        self.max_flags
    }

    #[inline]
    pub fn available(&self) -> u32 {
        self.available
    }

    /// Flags currently placed on the field.
    #[inline]
    pub fn in_use(&self) -> u32 {
        self.max_flags - self.available
    }

    /// Take one flag. Fails when none are left.
    pub fn take_flag(&mut self) -> bool {
        if self.available == 0 {
            trace!("flag budget exhausted");
            return false;
        }
        self.available -= 1;
        self.outbox.push(BudgetEvent::FlagTaken);
        self.push_amount();
        true
    }

    /// Give one flag back. Fails when the budget is already full.
    pub fn return_flag(&mut self) -> bool {
        if self.available == self.max_flags {
            trace!("flag budget already full");
            return false;
        }
        self.available += 1;
        self.outbox.push(BudgetEvent::FlagReturned);
        self.push_amount();
        true
    }

    pub fn drain_events(&mut self) -> Vec<BudgetEvent> {
        self.outbox.drain()
    }

    fn push_amount(&mut self) {
        self.outbox.push(BudgetEvent::FlagsAmountUpdate {
            available: self.available,
            max: self.max_flags,
        });
    }
}
