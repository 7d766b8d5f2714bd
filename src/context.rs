use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::ContextError;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// A cooperative cancellation signal with optional deadline.
///
/// Contexts form a tree: [`child`](Context::child), [`with_timeout`](Context::with_timeout)
/// and [`with_deadline`](Context::with_deadline) derive contexts that observe
/// their parent's cancellation and deadline, while cancelling a child never
/// affects the parent. Cloning a `Context` produces another handle to the
/// *same* node, not a child.
///
/// Cancellation is cooperative — nothing is interrupted. Workers inside
/// [`Executor::for_each_with_context`](crate::Executor::for_each_with_context)
/// check the context between loop iterations, and long-running loop bodies may
/// poll [`is_done`](Context::is_done) themselves.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use parfor::Context;
///
/// let root = Context::background();
/// let child = root.child();
///
/// assert!(!child.is_done());
/// root.cancel();
/// assert!(child.is_done(), "children observe parent cancellation");
///
/// let timed = Context::background().with_timeout(Duration::from_secs(30));
/// assert!(!timed.is_done());
/// ```
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<Arc<Inner>>,
}

impl Inner {
    fn err(&self) -> Option<ContextError> {
        // Explicit cancellation takes precedence over an elapsed deadline
        // when both apply.
        if self.cancelled.load(Ordering::Acquire) {
            return Some(ContextError::Canceled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(ContextError::DeadlineExceeded);
            }
        }
        self.parent.as_ref().and_then(|p| p.err())
    }
}

impl Context {
    /// The root context: never cancelled on its own, no deadline.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                deadline: None,
                parent: None,
            }),
        }
    }

    /// Derive a cancellable child context.
    ///
    /// The child is done when either it is cancelled directly or `self`
    /// becomes done; cancelling the child leaves `self` untouched.
    pub fn child(&self) -> Self {
        self.derive(None)
    }

    /// Derive a child context that is done once `deadline` passes.
    ///
    /// The effective deadline is the earliest one on the parent chain.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        self.derive(Some(deadline))
    }

    /// Derive a child context that is done `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.derive(Some(Instant::now() + timeout))
    }

    /// Signal cancellation on this context and everything derived from it.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Why this context is done, or `None` while it is still live.
    ///
    /// Returns [`ContextError::Canceled`] if this context or any ancestor was
    /// cancelled, [`ContextError::DeadlineExceeded`] if a deadline on the
    /// chain has passed.
    pub fn err(&self) -> Option<ContextError> {
        self.inner.err()
    }

    /// Whether this context has been cancelled or its deadline has passed.
    pub fn is_done(&self) -> bool {
        self.inner.err().is_some()
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                deadline,
                parent: Some(Arc::clone(&self.inner)),
            }),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("done", &self.is_done())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}
