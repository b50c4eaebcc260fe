//! Preparation timer and tick loop handles owned by a match.
//!
//! Both are plain state advanced by the match clock; nothing runs on its own.

use std::time::Duration;

/// Identifies one scheduling of the preparation timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreparationHandle(u64);

impl PreparationHandle {
    /// Generation number of the scheduling.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Single cancellable preparation deadline.
#[derive(Debug, Default)]
pub(crate) struct PreparationTimer {
    generation: u64,
    pending: Option<(PreparationHandle, Duration)>,
}

impl PreparationTimer {
    /// Replaces any pending deadline with a new one.
    pub(crate) fn schedule(&mut self, deadline: Duration) -> PreparationHandle {
        self.generation += 1;
        let handle = PreparationHandle(self.generation);
        self.pending = Some((handle, deadline));
        handle
    }

    /// Drops the pending deadline and invalidates its handle.
    ///
    /// Returns whether a deadline was pending; cancelling twice is a no-op.
    pub(crate) fn cancel(&mut self) -> bool {
        let cancelled = self.pending.take().is_some();
        if cancelled {
            self.generation += 1;
        }
        cancelled
    }

    /// Takes the pending handle if its deadline has passed.
    pub(crate) fn take_due(&mut self, now: Duration) -> Option<PreparationHandle> {
        match self.pending {
            Some((handle, deadline)) if now >= deadline => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }

    /// Reports whether `handle` belongs to the latest scheduling.
    pub(crate) fn is_current(&self, handle: PreparationHandle) -> bool {
        handle.0 == self.generation
    }

    pub(crate) fn pending(&self) -> Option<PreparationHandle> {
        self.pending.map(|(handle, _)| handle)
    }

    pub(crate) fn deadline(&self) -> Option<Duration> {
        self.pending.map(|(_, deadline)| deadline)
    }
}

/// Fixed-rate simulation loop state.
#[derive(Debug, Default)]
pub(crate) struct TickLoop {
    running: bool,
    ticks: u64,
}

impl TickLoop {
    pub(crate) fn start(&mut self) {
        self.running = true;
        self.ticks = 0;
    }

    /// Stops the loop. Returns whether it was running.
    pub(crate) fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub(crate) const fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks += 1;
    }

    pub(crate) const fn ticks(&self) -> u64 {
        self.ticks
    }
}
