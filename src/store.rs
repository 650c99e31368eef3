//! Store Module
//!
//! The scull storage engine: a lazily grown qset list behind one mutex.
//!
//! ## Responsibilities
//! - Translate byte offsets into (node, slot, offset)
//! - Grow the structure on demand during writes
//! - Serve bounded reads without ever allocating
//! - Reset everything on trim
//!
//! ## Concurrency Model: one owner at a time
//!
//! Reads, writes and trims all take the same guard. There is no reader/writer
//! split: a read blocks out a write and vice versa. Every operation touches at
//! most one quantum, so the guard is only held for a single bounded copy.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::config::Config;
use crate::error::{Result, ScullError};
use crate::interrupt::Interrupt;
use crate::qset::{self, AllocationBudget, Position, Quantum, QuantumSet};

/// Snapshot of a store's shape, for inspection and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    /// Logical size (high-water mark) in bytes
    pub size: u64,
    pub quantum: usize,
    pub qset: usize,
    /// Nodes in the qset list
    pub nodes: usize,
    /// Nodes whose slot array has been allocated
    pub slot_arrays: usize,
    /// Allocated quanta across all nodes
    pub quanta: usize,
    /// Bytes charged against the allocation budget
    pub allocated_bytes: usize,
}

/// Mutable state protected by the store mutex
#[derive(Debug)]
struct StoreState {
    /// First node of the list (None = empty store)
    head: Option<Box<QuantumSet>>,

    /// Current quantum size
    quantum: usize,

    /// Current slot array length
    qset: usize,

    /// Amount of data stored here
    size: u64,

    budget: AllocationBudget,
}

impl StoreState {
    fn empty(config: &Config) -> Self {
        Self {
            head: None,
            quantum: config.quantum,
            qset: config.qset,
            size: 0,
            budget: AllocationBudget::new(config.memory_limit),
        }
    }
}

impl Drop for StoreState {
    fn drop(&mut self) {
        qset::release(self.head.take());
    }
}

/// A scull store
pub struct Store {
    /// Geometry restored by trim
    config: Config,

    state: Mutex<StoreState>,

    /// Copy of `size`, stored under the guard, readable without it
    size_hint: AtomicU64,
}

impl Store {
    /// Create an empty store
    pub fn new(config: Config) -> Result<Self> {
        config.validate_geometry()?;
        let state = StoreState::empty(&config);

        tracing::trace!(
            quantum = config.quantum,
            qset = config.qset,
            memory_limit = ?config.memory_limit,
            "store created"
        );

        Ok(Self {
            config,
            state: Mutex::new(state),
            size_hint: AtomicU64::new(0),
        })
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Block until the store is ours
    pub fn lock(&self) -> StoreGuard<'_> {
        self.guard(self.state.lock())
    }

    /// Block until the store is ours or `interrupt` is raised.
    ///
    /// An uncontended lock is taken even if the token is already raised;
    /// the token only matters while actually waiting.
    pub fn lock_interruptible(&self, interrupt: &Interrupt) -> Result<StoreGuard<'_>> {
        if let Some(state) = self.state.try_lock() {
            return Ok(self.guard(state));
        }

        let poll = self.config.lock_poll_interval();
        loop {
            if interrupt.is_raised() {
                tracing::debug!("store lock wait interrupted");
                return Err(ScullError::Interrupted);
            }
            if let Some(state) = self.state.try_lock_for(poll) {
                return Ok(self.guard(state));
            }
        }
    }

    fn guard<'a>(&'a self, state: MutexGuard<'a, StoreState>) -> StoreGuard<'a> {
        StoreGuard {
            state,
            config: &self.config,
            size_hint: &self.size_hint,
        }
    }

    // =========================================================================
    // Locked Convenience Operations
    // =========================================================================

    /// Read under the guard. See [`StoreGuard::read`].
    pub fn read(&self, pos: &mut u64, buf: &mut [u8], count: usize) -> Result<usize> {
        self.lock().read(pos, buf, count)
    }

    /// Write under the guard. See [`StoreGuard::write`].
    pub fn write(&self, pos: &mut u64, buf: &[u8], count: usize) -> Result<usize> {
        self.lock().write(pos, buf, count)
    }

    /// Trim under the guard
    pub fn trim(&self) {
        self.lock().trim();
    }

    pub fn size(&self) -> u64 {
        self.lock().size()
    }

    /// Logical size without taking the guard.
    ///
    /// May trail an operation that is still in progress; used by seek.
    pub fn size_hint(&self) -> u64 {
        self.size_hint.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> StoreStats {
        self.lock().stats()
    }

    /// The configuration this store was built with
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Exclusive access to a store. Released on drop.
pub struct StoreGuard<'a> {
    state: MutexGuard<'a, StoreState>,
    config: &'a Config,
    size_hint: &'a AtomicU64,
}

impl StoreGuard<'_> {
    /// Read up to `count` bytes at `*pos` into `buf`.
    ///
    /// Never crosses a quantum boundary, never reads past `size`, and returns
    /// 0 both at end of data and at a hole (an unallocated region below
    /// `size`). On success `*pos` advances by the returned count.
    pub fn read(&mut self, pos: &mut u64, buf: &mut [u8], count: usize) -> Result<usize> {
        let state = &*self.state;

        if *pos >= state.size {
            return Ok(0);
        }

        // only read up to the currently available data
        let available = state.size - *pos;
        let count = match usize::try_from(available) {
            Ok(available) => count.min(available),
            Err(_) => count,
        };

        let at = Position::translate(*pos, state.quantum, state.qset);

        // holes are not filled: nothing is allocated and nothing is returned
        let Some(quantum) = qset::find(state.head.as_deref(), at.item)
            .and_then(|node| node.quantum(at.slot))
        else {
            tracing::trace!(pos = *pos, item = at.item, slot = at.slot, "read hit a hole");
            return Ok(0);
        };

        let count = count.min(at.quantum_remaining(state.quantum));
        let available = buf.len();
        let dst = buf
            .get_mut(..count)
            .ok_or(ScullError::IoFault { requested: count, available })?;
        dst.copy_from_slice(&quantum.as_slice()[at.offset..at.offset + count]);

        *pos += count as u64;
        Ok(count)
    }

    /// Write up to `count` bytes from `buf` at `*pos`.
    ///
    /// Grows node, slot array and quantum as needed (in that order), then
    /// copies at most to the end of the target quantum. On success `*pos`
    /// advances and `size` is raised to the new position if it was lower.
    ///
    /// Growth is best effort and never retracts: if an allocation fails, what
    /// was already linked by this call stays in place.
    pub fn write(&mut self, pos: &mut u64, buf: &[u8], count: usize) -> Result<usize> {
        let state = &mut *self.state;
        let (quantum_len, qset_len) = (state.quantum, state.qset);

        // a position that cannot advance is rejected before anything grows
        let at = Position::translate(*pos, quantum_len, qset_len);
        let count = count.min(at.quantum_remaining(quantum_len));
        let end = pos.checked_add(count as u64).ok_or_else(|| {
            ScullError::InvalidArgument(format!("write of {} bytes at {} overflows", count, pos))
        })?;

        let node = qset::follow(&mut state.head, at.item, &mut state.budget)?;
        let slots = node.slots_or_allocate(qset_len, &mut state.budget)?;

        let slot = &mut slots[at.slot];
        let quantum = match slot.take() {
            Some(quantum) => quantum,
            None => Quantum::allocate(quantum_len, &mut state.budget)?,
        };
        let quantum = slot.insert(quantum);

        let src = buf.get(..count).ok_or(ScullError::IoFault {
            requested: count,
            available: buf.len(),
        })?;
        quantum.as_mut_slice()[at.offset..at.offset + count].copy_from_slice(src);

        *pos = end;
        if state.size < end {
            state.size = end;
            self.size_hint.store(end, Ordering::Release);
        }

        tracing::trace!(
            item = at.item,
            slot = at.slot,
            offset = at.offset,
            count,
            size = state.size,
            "write"
        );
        Ok(count)
    }

    /// Empty the store and restore the configured geometry.
    ///
    /// Only reachable through a guard, so the caller always holds the lock.
    pub fn trim(&mut self) {
        let state = &mut *self.state;
        let released = qset::release(state.head.take());

        state.quantum = self.config.quantum;
        state.qset = self.config.qset;
        state.size = 0;
        state.budget.reset();
        self.size_hint.store(0, Ordering::Release);

        tracing::debug!(released, "store trimmed");
    }

    /// Logical size in bytes
    pub fn size(&self) -> u64 {
        self.state.size
    }

    pub fn quantum(&self) -> usize {
        self.state.quantum
    }

    pub fn qset(&self) -> usize {
        self.state.qset
    }

    /// Walk the list and count what is allocated
    pub fn stats(&self) -> StoreStats {
        let state = &*self.state;
        let mut stats = StoreStats {
            size: state.size,
            quantum: state.quantum,
            qset: state.qset,
            allocated_bytes: state.budget.used(),
            ..StoreStats::default()
        };

        for node in qset::iter(state.head.as_deref()) {
            stats.nodes += 1;
            if let Some(slots) = node.slots() {
                stats.slot_arrays += 1;
                stats.quanta += slots.iter().filter(|slot| slot.is_some()).count();
            }
        }

        stats
    }
}
