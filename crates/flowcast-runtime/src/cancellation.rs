#![forbid(unsafe_code)]

//! Cancellation tokens for frame loops.
//!
//! A [`CancellationSource`] is held by whoever owns a loop; the loop itself
//! polls a [`CancellationToken`] before doing any work. Once cancelled, a
//! source stays cancelled: loops are never resumed, only replaced.
//!
//! # Example
//!
//! ```
//! use flowcast_runtime::cancellation::CancellationSource;
//!
//! let source = CancellationSource::new();
//! let token = source.token();
//! assert!(!token.is_cancelled());
//! source.cancel();
//! assert!(token.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable view of a cancellation flag.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

/// Owner side of a cancellation flag.
///
/// Dropping the source does **not** cancel its tokens; call
/// [`cancel`](Self::cancel) explicitly.
#[derive(Debug)]
pub struct CancellationSource {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A token observing this source.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Signal cancellation. Idempotent; returns `true` on the first call.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// A token that is already cancelled.
    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(true)),
        }
    }
}
