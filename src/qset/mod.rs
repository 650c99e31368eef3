//! QSet Module
//!
//! The sparse storage structure behind a scull store.
//!
//! ## Layout
//! ```text
//!   head ──► QuantumSet ──► QuantumSet ──► ... (grows one node at a time)
//!               │
//!               ▼
//!            [slot 0][slot 1] ... [slot qset-1]
//!               │       │
//!               ▼       ▼
//!            quantum  (hole)
//! ```
//!
//! A missing node, slot array or quantum is a hole. Holes are never filled
//! by reads; only writes allocate, one level at a time.

mod address;
mod budget;
mod node;

pub use address::Position;
pub use budget::AllocationBudget;
pub use node::{find, follow, iter, release, Quantum, QuantumSet, NODE_BYTES, SLOT_BYTES};
