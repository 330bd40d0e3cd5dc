//! Per-state employee counters fed by the statistics collaborator.
use std::sync::atomic::{AtomicU32, Ordering};

use crate::job::JobState;

/// Lock-free employee counts, one atomic per participation state.
///
/// Counts never drop below zero.
#[derive(Debug, Default)]
pub struct EmployeeCounter {
    counts: [AtomicU32; JobState::ALL.len()],
}

impl EmployeeCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, state: JobState) -> &AtomicU32 {
        &self.counts[state.index()]
    }

    pub fn increment(&self, state: JobState, amount: u32) {
        // fetch_update only errs when the closure returns None.
        let _ = self
            .slot(state)
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(amount))
            });
    }

    pub fn decrement(&self, state: JobState, amount: u32) {
        let _ = self
            .slot(state)
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(amount))
            });
    }

    /// Signed adjustment; negative totals clamp to zero.
    pub fn set(&self, state: JobState, amount: i64) {
        let clamped = u32::try_from(amount.max(0)).unwrap_or(u32::MAX);
        self.slot(state).store(clamped, Ordering::Release);
    }

    #[must_use]
    pub fn count_for(&self, state: JobState) -> u32 {
        self.slot(state).load(Ordering::Acquire)
    }

    #[must_use]
    pub fn total_count(&self) -> u64 {
        JobState::ALL
            .iter()
            .map(|state| u64::from(self.count_for(*state)))
            .sum()
    }

    /// Point-in-time copy of every state's count.
    #[must_use]
    pub fn snapshot(&self) -> [(JobState, u32); JobState::ALL.len()] {
        JobState::ALL.map(|state| (state, self.count_for(state)))
    }
}
