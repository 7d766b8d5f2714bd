//! # parfor
//!
//! OpenMP-style parallel for loops — generic, embeddable, zero opinions.
//!
//! parfor runs a bounded index range `[0, n)` across a configurable number
//! of worker threads, the way an OpenMP `parallel for` pragma would. It owns
//! the work-distribution strategies, the contracts ([`Strategy`],
//! [`IndexGenerator`], [`LoopExecutor`]), the error types, and the fluent
//! configuration API. It does **not** own your data, your synchronization,
//! or your error type — the loop body belongs to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! fn sinc_scaled(i: usize) -> u64 {
//!     // stand-in for real per-index work
//!     (i as u64).wrapping_mul(i as u64)
//! }
//!
//! let n = 10_000;
//! let output: Vec<AtomicU64> = (0..n).map(|_| AtomicU64::new(0)).collect();
//!
//! // Equivalent to `for i in 0..n { output[i] = sinc_scaled(i); }`,
//! // parallelized over one worker per logical CPU.
//! parfor::executor()
//!     .for_each(n, |i, _worker_id| {
//!         output[i].store(sinc_scaled(i), Ordering::Relaxed);
//!         Ok::<_, std::io::Error>(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(output[100].load(Ordering::Relaxed), sinc_scaled(100));
//! ```
//!
//! Every index is visited exactly once by exactly one worker, so by-index
//! writes to disjoint slots like the above are race-free by construction.
//!
//! # Choosing a strategy
//!
//! By default each worker is pre-assigned a contiguous block of indices —
//! zero coordination overhead, ideal when every index costs about the same.
//! When per-index cost is skewed, let workers claim indices dynamically from
//! a shared counter instead:
//!
//! ```rust
//! use parfor::StrategyKind;
//!
//! let ex = parfor::executor()
//!     .with_workers(8)
//!     .with_strategy(StrategyKind::FetchNextIndex);
//!
//! ex.for_each(100, |_i, _| {
//!     // expensive for some i, cheap for others — fast workers absorb more
//!     Ok::<_, std::io::Error>(())
//! })
//! .unwrap();
//! ```
//!
//! # Errors and cancellation
//!
//! If the loop body returns an error, the worker that observed it stops and
//! the first error captured is returned after all workers join; with plain
//! [`for_each`](Executor::for_each), sibling workers finish their assigned
//! indices undisturbed. To abort the whole loop on the first error — or on
//! a timeout — use
//! [`for_each_with_context`](Executor::for_each_with_context):
//!
//! ```rust
//! use std::time::Duration;
//! use parfor::Context;
//!
//! let ctx = Context::background().with_timeout(Duration::from_secs(5));
//!
//! let result = parfor::executor().for_each_with_context(&ctx, 1_000, |_ctx, i, _| {
//!     if i == 42 {
//!         return Err("unlucky index");
//!     }
//!     Ok(())
//! });
//!
//! // Siblings stop at their next iteration once the error is captured.
//! assert_eq!(result.unwrap_err().into_body(), Some("unlucky index"));
//! ```

#![forbid(unsafe_code)]

mod context;
mod error;
mod executor;
mod runtime;
mod strategy;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use context::Context;
pub use error::{ContextError, ForError};
pub use executor::Executor;
pub use runtime::{LoopExecutor, SerialExecutor};
pub use strategy::{
    AtomicCounterStrategy, ContiguousBlocksStrategy, IndexGenerator, Strategy, StrategyKind,
};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create an [`Executor`] with the default configuration: one worker per
/// logical CPU, contiguous-blocks work distribution.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let visited = AtomicUsize::new(0);
///
/// parfor::executor()
///     .with_workers(4)
///     .for_each(100, |_i, _worker_id| {
///         visited.fetch_add(1, Ordering::Relaxed);
///         Ok::<_, std::io::Error>(())
///     })
///     .unwrap();
///
/// assert_eq!(visited.load(Ordering::Relaxed), 100);
/// ```
pub fn executor() -> Executor {
    Executor::new()
}
