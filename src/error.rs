use thiserror::Error;

/// Why a [`Context`](crate::Context) is done.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// The error returned by
/// [`Executor::for_each_with_context`](crate::Executor::for_each_with_context).
///
/// `E` is the caller's loop-body error type, forwarded unexamined. The
/// executor raises no errors of its own on the happy path; the only
/// executor-originated variant is [`Context`](ForError::Context), reported
/// when the caller's context was cancelled or expired and no body error was
/// ever captured.
///
/// Precedence is fixed: a captured body error always wins over a context
/// error, even when both apply to the same call.
#[derive(Error, Debug)]
pub enum ForError<E> {
    /// The loop body returned an error. At most one surfaces per call — the
    /// first captured; concurrent errors from other workers are dropped.
    #[error("loop body failed: {0}")]
    Body(E),

    /// The caller-supplied context was cancelled or its deadline passed
    /// before the iteration range was exhausted.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl<E> ForError<E> {
    /// The body error, if this is a [`Body`](ForError::Body) failure.
    /// Callers use this to recover their own error type without pattern
    /// matching on variants.
    pub fn into_body(self) -> Option<E> {
        match self {
            Self::Body(e) => Some(e),
            Self::Context(_) => None,
        }
    }
}
