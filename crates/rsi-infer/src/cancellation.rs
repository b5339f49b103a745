//! Cooperative cancellation.
//!
//! Inference polls the signal between return statements; a host flips it from
//! another thread through a cloned `CancellationToken`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A source of the "stop now" signal.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Cancellation for CancellationToken {
    #[inline]
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

impl<F> Cancellation for F
where
    F: Fn() -> bool,
{
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}
