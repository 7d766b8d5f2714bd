use crate::executor::Executor;

// ---------------------------------------------------------------------------
// LoopExecutor
// ---------------------------------------------------------------------------

/// The minimal loop-running capability shared by [`Executor`] and
/// [`SerialExecutor`]: iterate `[0, n)`, invoke the body for each index,
/// stop on the first error.
///
/// Code written against this trait runs unchanged on either implementation,
/// so tests can swap the parallel executor for a deterministic serial one:
///
/// ```rust
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use parfor::{LoopExecutor, SerialExecutor};
///
/// fn sum_of_squares(runtime: &impl LoopExecutor, n: usize) -> u64 {
///     let acc = AtomicU64::new(0);
///     runtime
///         .for_each(n, |i, _| {
///             acc.fetch_add((i as u64) * (i as u64), Ordering::Relaxed);
///             Ok::<_, std::io::Error>(())
///         })
///         .unwrap();
///     acc.load(Ordering::Relaxed)
/// }
///
/// assert_eq!(sum_of_squares(&SerialExecutor, 4), 14);
/// assert_eq!(sum_of_squares(&parfor::executor(), 4), 14);
/// ```
///
/// The bounds mirror the parallel implementation's needs (`F: Sync`,
/// `E: Send`); the serial implementation simply doesn't exploit them.
pub trait LoopExecutor {
    /// Run `body(i, worker_id)` for every `i` in `[0, n)` and return the
    /// first observed error.
    fn for_each<E, F>(&self, n: usize, body: F) -> Result<(), E>
    where
        F: Fn(usize, usize) -> Result<(), E> + Sync,
        E: Send;
}

impl LoopExecutor for Executor {
    fn for_each<E, F>(&self, n: usize, body: F) -> Result<(), E>
    where
        F: Fn(usize, usize) -> Result<(), E> + Sync,
        E: Send,
    {
        Executor::for_each(self, n, body)
    }
}

// ---------------------------------------------------------------------------
// SerialExecutor
// ---------------------------------------------------------------------------

/// Runs the loop on the calling thread, one index at a time, in order, with
/// a fixed `worker_id` of 0. Returns at the first body error.
///
/// The primary use case is testing: it satisfies the same [`LoopExecutor`]
/// contract as [`Executor`] while being fully deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialExecutor;

impl LoopExecutor for SerialExecutor {
    fn for_each<E, F>(&self, n: usize, body: F) -> Result<(), E>
    where
        F: Fn(usize, usize) -> Result<(), E> + Sync,
        E: Send,
    {
        for i in 0..n {
            body(i, 0)?;
        }
        Ok(())
    }
}
