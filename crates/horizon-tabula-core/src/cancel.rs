//! Per-request cancellation.
//!
//! Each request carries a [`CancellationToken`]. Data loading checks it before
//! calling into a binder, and binders that run long queries are expected to
//! poll it themselves.
//!
//! ```
//! use horizon_tabula_core::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let observer = token.clone();
//! token.cancel();
//! assert!(observer.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A token for cooperative cancellation of request work.
///
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        if !self.inner.swap(true, Ordering::Release) {
            tracing::debug!(target: "horizon_tabula_core::cancel", "request cancelled");
        }
    }

    /// Reset the token so it can be reused.
    pub fn reset(&self) {
        self.inner.store(false, Ordering::Release);
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
