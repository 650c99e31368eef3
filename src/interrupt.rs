//! Interrupt tokens
//!
//! A blocked [`Store::lock_interruptible`](crate::Store::lock_interruptible)
//! gives up with [`ScullError::Interrupted`](crate::ScullError::Interrupted)
//! once its token is raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every waiter holding a clone of this token
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Re-arm the token after an interrupted call has been handled
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}
