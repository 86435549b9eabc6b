//! Per-attempt cancellation handle.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use super::Transport;

/// Pairs a cancellation signal with the transport's cancel action.
///
/// Owned by exactly one attempt. The cancel action fires at most once and
/// only while the attempt is unsettled; after [`settle`](Self::settle) the
/// handle is inert. Dropping an unsettled handle cancels it, so abandoning an
/// in-flight future aborts the underlying call.
pub struct CancelHandle<T: Transport> {
    transport: Arc<T>,
    signal: CancellationToken,
    done: AtomicBool,
}

impl<T: Transport> CancelHandle<T> {
    /// Creates a handle with a fresh signal.
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            signal: CancellationToken::new(),
            done: AtomicBool::new(false),
        }
    }

    /// Returns the signal to thread into the transport call.
    #[must_use]
    pub fn signal(&self) -> CancellationToken {
        self.signal.clone()
    }

    /// Cancels the call unless it already settled or was cancelled.
    ///
    /// Returns true if the transport's cancel action was invoked.
    pub fn cancel(&self) -> bool {
        if self.done.swap(true, Ordering::AcqRel) {
            return false;
        }

        tracing::trace!("Cancelling in-flight request");
        self.transport.cancel(&self.signal);
        true
    }

    /// Marks the call as settled, making later cancellation a no-op.
    ///
    /// Returns false if the handle was already settled or cancelled.
    pub fn settle(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }

    /// Returns true once the handle settled or cancelled.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

impl<T: Transport> Drop for CancelHandle<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T: Transport> fmt::Debug for CancelHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("signal", &self.signal)
            .field("done", &self.is_done())
            .finish_non_exhaustive()
    }
}
