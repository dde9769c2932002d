//! Bounded worker pool with first-error cancellation.
//!
//! Every unit runs on a fixed-width `rayon` pool inside a child
//! cancellation scope. The first failing unit records its error and
//! cancels the scope; units that have not started yet are skipped and
//! running units observe the cancellation through their token. `run`
//! returns only after every unit has been joined.

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::core::cancel::Cancel;
use crate::core::progress::Progress;
use crate::error::{Error, Result};

/// Fixed-width pool for per-leaf work.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    width: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("width", &self.width)
            .finish()
    }
}

impl WorkerPool {
    /// Build a pool running at most `width` units at once.
    pub fn new(width: usize) -> Result<Self> {
        let width = width.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(width)
            .thread_name(|i| format!("stowage-worker-{}", i))
            .build()
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
        Ok(Self { pool, width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Run `work` for every item and collect the outputs in input order.
    ///
    /// Ordering of execution is unspecified. On failure the first recorded
    /// error is returned; if the caller's token was cancelled and no unit
    /// failed on its own, [`Error::Cancelled`] is returned.
    pub fn run<T, R, F>(
        &self,
        items: &[T],
        cancel: &Cancel,
        progress: &dyn Progress,
        work: F,
    ) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T, &Cancel) -> Result<R> + Sync,
    {
        let scope = cancel.child();
        let first_error: Mutex<Option<Error>> = Mutex::new(None);

        debug!(units = items.len(), width = self.width, "starting worker pool");
        progress.start(items.len());

        let outputs: Vec<Option<R>> = self.pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(index, item)| {
                    if scope.is_cancelled() {
                        trace!(index, "skipping unit, scope cancelled");
                        return None;
                    }
                    match work(item, &scope) {
                        Ok(output) => {
                            progress.inc();
                            Some(output)
                        }
                        Err(e) => {
                            let mut slot = first_error.lock();
                            if slot.is_none() {
                                debug!(index, error = %e, "unit failed, cancelling siblings");
                                *slot = Some(e);
                            }
                            scope.cancel();
                            None
                        }
                    }
                })
                .collect()
        });

        progress.finish();

        if let Some(e) = first_error.into_inner() {
            return Err(e);
        }
        cancel.check()?;

        outputs
            .into_iter()
            .map(|o| o.ok_or(Error::Cancelled))
            .collect()
    }
}
