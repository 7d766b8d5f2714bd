use std::sync::atomic::{AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// A per-worker cursor over the iteration range.
///
/// Each worker owns exactly one generator and pulls indices from it until
/// exhaustion. Exhaustion is permanent: once `next_index` returns `None`, it
/// returns `None` forever.
///
/// Generators are never shared between workers, but they may borrow state
/// shared across all generators of one invocation (see
/// [`AtomicCounterStrategy`]).
pub trait IndexGenerator: Send {
    /// Claim the next loop index, or `None` when this worker's share of the
    /// range is exhausted.
    fn next_index(&mut self) -> Option<usize>;
}

/// Decides how the iteration range `[0, n)` is partitioned among workers.
///
/// Implement this to plug in a custom work-distribution scheme — most users
/// should instead pick a built-in via
/// [`Executor::with_strategy`](crate::Executor::with_strategy).
///
/// # Contract
///
/// Across the `workers` generators produced for one invocation, every index
/// in `[0, n)` must be yielded by exactly one generator, with no repeats.
/// The executor relies on this for race-free by-index output writes.
///
/// # Thread Safety
///
/// `Send + Sync` are required — one strategy value is shared by all workers
/// of an invocation, each calling [`index_generator`](Strategy::index_generator)
/// from its own thread.
///
/// # Example
///
/// ```rust
/// use parfor::{IndexGenerator, Strategy};
///
/// /// Hands worker 0 the whole range and everyone else nothing.
/// struct GreedyFirstWorker;
///
/// struct RangeCursor(std::ops::Range<usize>);
///
/// impl IndexGenerator for RangeCursor {
///     fn next_index(&mut self) -> Option<usize> {
///         self.0.next()
///     }
/// }
///
/// impl Strategy for GreedyFirstWorker {
///     fn index_generator(
///         &self,
///         _workers: usize,
///         worker_id: usize,
///         n: usize,
///     ) -> Box<dyn IndexGenerator + Send + '_> {
///         let range = if worker_id == 0 { 0..n } else { 0..0 };
///         Box::new(RangeCursor(range))
///     }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Produce the cursor for one worker of an invocation with `workers`
    /// workers iterating over `[0, n)`. `workers` is at least 1 and
    /// `worker_id` is in `[0, workers)`; the executor guarantees both.
    ///
    /// The returned generator may borrow from `self`, which the executor
    /// keeps alive until every worker has joined.
    fn index_generator(
        &self,
        workers: usize,
        worker_id: usize,
        n: usize,
    ) -> Box<dyn IndexGenerator + Send + '_>;
}

// ---------------------------------------------------------------------------
// Strategy selection
// ---------------------------------------------------------------------------

/// Selects a built-in work-distribution strategy on an
/// [`Executor`](crate::Executor).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyKind {
    /// Use the per-call default (currently [`PreassignIndices`](StrategyKind::PreassignIndices)).
    #[default]
    UseDefaults,

    /// Statically pre-assign each worker a contiguous block of indices
    /// ([`ContiguousBlocksStrategy`]). Zero contention; best when per-index
    /// cost is uniform.
    PreassignIndices,

    /// Dynamically claim indices from a shared atomic counter
    /// ([`AtomicCounterStrategy`]). One synchronized operation per index;
    /// best when per-index cost is skewed.
    FetchNextIndex,
}

// ---------------------------------------------------------------------------
// Contiguous blocks
// ---------------------------------------------------------------------------

/// Static partitioning: near-equal contiguous blocks, one per worker.
///
/// The range splits into `workers` blocks of `n / workers` indices, with the
/// `n % workers` remainder distributed one extra index each to the
/// lowest-numbered workers, so block sizes differ by at most 1. Each worker
/// walks its own half-open range with no synchronization at all.
pub struct ContiguousBlocksStrategy;

struct BlockGenerator {
    next: usize,
    end: usize,
}

impl IndexGenerator for BlockGenerator {
    fn next_index(&mut self) -> Option<usize> {
        if self.next < self.end {
            let i = self.next;
            self.next += 1;
            Some(i)
        } else {
            None
        }
    }
}

impl Strategy for ContiguousBlocksStrategy {
    fn index_generator(
        &self,
        workers: usize,
        worker_id: usize,
        n: usize,
    ) -> Box<dyn IndexGenerator + Send + '_> {
        let base = n / workers;
        let remainder = n % workers;
        // Workers below the remainder take one extra index; their blocks
        // shift the start of every block after them.
        let start = worker_id * base + worker_id.min(remainder);
        let len = base + usize::from(worker_id < remainder);
        Box::new(BlockGenerator {
            next: start,
            end: start + len,
        })
    }
}

// ---------------------------------------------------------------------------
// Atomic counter
// ---------------------------------------------------------------------------

/// Dynamic partitioning: workers claim indices from one shared counter.
///
/// All generators produced by one strategy value share its counter, so
/// faster workers absorb more of the range — load balancing at the cost of
/// one atomic fetch-and-add per claimed index. `worker_id` plays no part in
/// claim order.
///
/// A value must serve exactly one `for_each` invocation: the counter starts
/// at 0 and is never reset, so reusing a value across calls would interleave
/// their claims. The executor creates a fresh value per call when this
/// strategy is selected via
/// [`StrategyKind::FetchNextIndex`](crate::StrategyKind::FetchNextIndex);
/// installing one via
/// [`with_custom_strategy`](crate::Executor::with_custom_strategy) makes the
/// one-call discipline the caller's responsibility.
#[derive(Default)]
pub struct AtomicCounterStrategy {
    counter: AtomicUsize,
}

impl AtomicCounterStrategy {
    /// A strategy with its counter at 0, ready for one invocation.
    pub fn new() -> Self {
        Self::default()
    }
}

struct FetchNextGenerator<'a> {
    counter: &'a AtomicUsize,
    n: usize,
}

impl IndexGenerator for FetchNextGenerator<'_> {
    fn next_index(&mut self) -> Option<usize> {
        // Claims are made by the fetch-and-add itself; a claim at or past n
        // means the range is drained for everyone.
        let i = self.counter.fetch_add(1, Ordering::Relaxed);
        (i < self.n).then_some(i)
    }
}

impl Strategy for AtomicCounterStrategy {
    fn index_generator(
        &self,
        _workers: usize,
        _worker_id: usize,
        n: usize,
    ) -> Box<dyn IndexGenerator + Send + '_> {
        Box::new(FetchNextGenerator {
            counter: &self.counter,
            n,
        })
    }
}
