//! Progress side channel for bulk operations.
//!
//! Pack and unpack call [`Progress::inc`] once per completed leaf. A sink
//! never influences control flow or error outcomes.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Incrementable progress sink.
pub trait Progress: Send + Sync {
    /// Announce the total number of units about to run.
    fn start(&self, _total: usize) {}

    /// One unit completed.
    fn inc(&self);

    /// All units finished (successfully or not).
    fn finish(&self) {}
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn inc(&self) {}
}

/// Sink that only counts completed units.
#[derive(Debug, Default)]
pub struct Counter {
    done: AtomicUsize,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

impl Progress for Counter {
    fn inc(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }
}
