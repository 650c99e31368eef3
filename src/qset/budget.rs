//! Allocation budget
//!
//! Tracks how many bytes a store has allocated for its structure and
//! refuses allocations that would exceed the configured limit.

use crate::error::{Result, ScullError};

/// Byte accounting for one store
#[derive(Debug, Clone, Default)]
pub struct AllocationBudget {
    /// Maximum bytes (None = unlimited)
    limit: Option<usize>,

    /// Bytes currently charged
    used: usize,
}

impl AllocationBudget {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    /// Charge `bytes` for an allocation of `what`, or fail without charging.
    pub fn charge(&mut self, what: &'static str, bytes: usize) -> Result<()> {
        let used = self
            .used
            .checked_add(bytes)
            .ok_or(ScullError::OutOfMemory { what, bytes })?;

        if let Some(limit) = self.limit {
            if used > limit {
                tracing::debug!(what, bytes, used = self.used, limit, "allocation over budget");
                return Err(ScullError::OutOfMemory { what, bytes });
            }
        }

        self.used = used;
        Ok(())
    }

    /// Give back a charge whose allocation did not happen
    pub fn refund(&mut self, bytes: usize) {
        self.used = self.used.saturating_sub(bytes);
    }

    /// Forget every charge (everything was freed)
    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
