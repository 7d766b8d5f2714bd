use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::context::Context;
use crate::error::ForError;
use crate::strategy::{AtomicCounterStrategy, ContiguousBlocksStrategy, Strategy, StrategyKind};

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Runs parallel loops over a bounded index range.
///
/// An `Executor` is a plain configuration value: a worker count and a
/// work-distribution strategy. Configure it with chained builder methods,
/// then call [`for_each`](Executor::for_each) or
/// [`for_each_with_context`](Executor::for_each_with_context) as many times
/// as you like — every call spawns a fresh set of scoped worker threads and
/// joins them all before returning.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use parfor::StrategyKind;
///
/// fn expensive(i: usize) -> u64 {
///     (i as u64).pow(2)
/// }
///
/// let ex = parfor::executor().with_strategy(StrategyKind::FetchNextIndex);
///
/// // One partial sum per worker, combined after the join — no locking
/// // inside the loop body.
/// let partials: Vec<AtomicU64> = (0..ex.worker_count()).map(|_| AtomicU64::new(0)).collect();
///
/// ex.for_each(1_000, |i, worker_id| {
///     partials[worker_id].fetch_add(expensive(i), Ordering::Relaxed);
///     Ok::<_, std::io::Error>(())
/// })
/// .unwrap();
///
/// let total: u64 = partials.iter().map(|p| p.load(Ordering::Relaxed)).sum();
/// assert_eq!(total, (0..1_000u64).map(|i| i * i).sum());
/// ```
pub struct Executor {
    workers: usize,
    strategy: Selection,
}

/// Which strategy an invocation should materialize.
///
/// Built-in selections are stored as a tag rather than a value so that
/// [`StrategyKind::FetchNextIndex`] gets a fresh counter every call.
enum Selection {
    Builtin(StrategyKind),
    Custom(Arc<dyn Strategy>),
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            workers: num_cpus(),
            strategy: Selection::Builtin(StrategyKind::UseDefaults),
        }
    }
}

impl Executor {
    /// An executor with one worker per logical CPU and the default strategy.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Configuration ─────────────────────────────────────────────────────

    /// The number of workers this executor spawns per call.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Set an explicit worker count.
    ///
    /// A count of 0 is clamped to 1 — a loop must always have at least one
    /// worker to make progress. Counts exceeding the CPU count are accepted
    /// but won't improve throughput for CPU-bound bodies.
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    /// Set the worker count as a proportion of logical CPUs, clamped to a
    /// minimum of 1.
    ///
    /// `with_cpu_proportion(0.5)` on an 8-core machine yields 4 workers.
    pub fn with_cpu_proportion(mut self, p: f64) -> Self {
        self.workers = ((p * num_cpus() as f64) as usize).max(1);
        self
    }

    /// Select a built-in work-distribution strategy.
    ///
    /// [`StrategyKind::UseDefaults`] resets any previous selection — built-in
    /// or custom — back to the per-call default
    /// ([`ContiguousBlocksStrategy`]).
    pub fn with_strategy(mut self, kind: StrategyKind) -> Self {
        self.strategy = Selection::Builtin(kind);
        self
    }

    /// Install a custom [`Strategy`].
    ///
    /// Defining strategies is an advanced feature; most callers should pick
    /// a built-in via [`with_strategy`](Executor::with_strategy) instead.
    pub fn with_custom_strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategy = Selection::Custom(Arc::new(strategy));
        self
    }

    // ── Parallel loops ────────────────────────────────────────────────────

    /// Run `body(i, worker_id)` for every `i` in `[0, n)`, parallelized
    /// across this executor's workers, and return the first observed error.
    ///
    /// `worker_id` identifies which worker executed the call, in
    /// `[0, worker_count)`. If only `i` is used, this corresponds directly
    /// to `for i in 0..n { body(i)?; }`. `worker_id` exists so each worker
    /// can accumulate a partial result without synchronization, to be
    /// combined after the call returns.
    ///
    /// A worker whose body call fails stops consuming indices, but its
    /// siblings are *not* told: they run their remaining indices to
    /// completion. Use
    /// [`for_each_with_context`](Executor::for_each_with_context) for
    /// abort-siblings-on-error semantics.
    ///
    /// The first error to be captured wins; with several workers failing
    /// concurrently that is not necessarily the smallest `i`. Later errors
    /// are dropped.
    ///
    /// Blocks until every worker has terminated. `n == 0` returns `Ok(())`
    /// without invoking the body.
    pub fn for_each<E, F>(&self, n: usize, body: F) -> Result<(), E>
    where
        F: Fn(usize, usize) -> Result<(), E> + Sync,
        E: Send,
    {
        let strategy = self.invocation_strategy();
        let first_err = Mutex::new(None);
        let workers = self.workers.max(1);

        log::trace!("for_each: {workers} workers over {n} iterations");

        thread::scope(|scope| {
            for worker_id in 0..workers {
                let strategy = &strategy;
                let body = &body;
                let first_err = &first_err;
                scope.spawn(move || {
                    let mut gen = strategy.index_generator(workers, worker_id, n);
                    while let Some(i) = gen.next_index() {
                        if let Err(err) = body(i, worker_id) {
                            record_first(first_err, err, worker_id);
                            return;
                        }
                    }
                });
            }
        });

        match take_first(first_err) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Like [`for_each`](Executor::for_each), with cooperative cancellation
    /// derived from `ctx`.
    ///
    /// A child context is derived from `ctx` before any worker spawns, and
    /// every worker checks it immediately before each body call, stopping
    /// without invoking the body once it is done. The first body error both
    /// claims the error slot and cancels the derived context, so siblings
    /// stop at their next check — extra work after an error is bounded by
    /// whatever each worker had already started.
    ///
    /// The body receives the derived context and may poll it inside
    /// long-running iterations.
    ///
    /// If `ctx` is already done on entry, no body calls are made and the
    /// context's error is returned promptly. Precedence is fixed: a captured
    /// body error is returned as [`ForError::Body`] even if `ctx` also
    /// expired; [`ForError::Context`] is returned only when no body error
    /// was ever captured.
    pub fn for_each_with_context<E, F>(
        &self,
        ctx: &Context,
        n: usize,
        body: F,
    ) -> Result<(), ForError<E>>
    where
        F: Fn(&Context, usize, usize) -> Result<(), E> + Sync,
        E: Send,
    {
        let strategy = self.invocation_strategy();
        let first_err = Mutex::new(None);
        let workers = self.workers.max(1);

        // Dropped unconditionally when this call returns, whatever the path.
        let loop_ctx = ctx.child();

        log::trace!("for_each_with_context: {workers} workers over {n} iterations");

        thread::scope(|scope| {
            for worker_id in 0..workers {
                let strategy = &strategy;
                let body = &body;
                let first_err = &first_err;
                let loop_ctx = &loop_ctx;
                scope.spawn(move || {
                    let mut gen = strategy.index_generator(workers, worker_id, n);
                    while let Some(i) = gen.next_index() {
                        // Don't start the work if the loop has been cancelled.
                        if loop_ctx.is_done() {
                            return;
                        }
                        if let Err(err) = body(loop_ctx, i, worker_id) {
                            record_first(first_err, err, worker_id);
                            loop_ctx.cancel();
                            return;
                        }
                    }
                });
            }
        });

        match take_first(first_err) {
            Some(err) => Err(ForError::Body(err)),
            // The *input* context, not the derived one — the derived context
            // is cancelled by this call itself on a body error.
            None => match ctx.err() {
                Some(ctx_err) => Err(ctx_err.into()),
                None => Ok(()),
            },
        }
    }

    /// Materialize the strategy for one invocation.
    ///
    /// Built-ins are constructed fresh here so the atomic-counter strategy
    /// never carries a counter over from a previous call.
    fn invocation_strategy(&self) -> Arc<dyn Strategy> {
        match &self.strategy {
            Selection::Builtin(StrategyKind::FetchNextIndex) => {
                Arc::new(AtomicCounterStrategy::new())
            }
            Selection::Builtin(_) => Arc::new(ContiguousBlocksStrategy),
            Selection::Custom(strategy) => Arc::clone(strategy),
        }
    }
}

// ---------------------------------------------------------------------------
// First-error slot
// ---------------------------------------------------------------------------

/// Store `err` if the slot is still empty — the single-assignment race that
/// picks which concurrent error surfaces.
fn record_first<E>(slot: &Mutex<Option<E>>, err: E, worker_id: usize) {
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        log::debug!("worker {worker_id} captured the first error");
        *guard = Some(err);
    }
}

fn take_first<E>(slot: Mutex<Option<E>>) -> Option<E> {
    slot.into_inner().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Get the logical CPU count, with a safe fallback.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
