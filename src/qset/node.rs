//! Quantum buffers and qset nodes
//!
//! Every level owns the level below it: the list owns its nodes, a node owns
//! its slot array, a slot owns its quantum. Nothing is shared.

use std::mem;

use crate::error::{Result, ScullError};

use super::AllocationBudget;

/// Bytes charged for one qset node
pub const NODE_BYTES: usize = mem::size_of::<QuantumSet>();

/// Bytes charged per slot of a slot array
pub const SLOT_BYTES: usize = mem::size_of::<Option<Quantum>>();

/// Fixed-size raw byte buffer, the leaf allocation unit
#[derive(Debug)]
pub struct Quantum(Box<[u8]>);

impl Quantum {
    /// Allocate a zeroed quantum of `len` bytes
    pub fn allocate(len: usize, budget: &mut AllocationBudget) -> Result<Self> {
        budget.charge("quantum", len)?;

        let mut buf = Vec::new();
        if buf.try_reserve_exact(len).is_err() {
            budget.refund(len);
            return Err(ScullError::OutOfMemory {
                what: "quantum",
                bytes: len,
            });
        }
        buf.resize(len, 0);

        Ok(Self(buf.into_boxed_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

/// One node of the qset list
#[derive(Debug, Default)]
pub struct QuantumSet {
    /// Slot array, allocated as a whole on first write into this node
    data: Option<Box<[Option<Quantum>]>>,

    /// Next node in the list
    next: Option<Box<QuantumSet>>,
}

impl QuantumSet {
    /// Allocate an empty node
    pub fn allocate(budget: &mut AllocationBudget) -> Result<Box<Self>> {
        budget.charge("qset node", NODE_BYTES)?;
        Ok(Box::default())
    }

    /// Slot array, if allocated
    pub fn slots(&self) -> Option<&[Option<Quantum>]> {
        self.data.as_deref()
    }

    /// Quantum stored in `slot`, if both the array and the quantum exist
    pub fn quantum(&self, slot: usize) -> Option<&Quantum> {
        self.data.as_deref()?.get(slot)?.as_ref()
    }

    /// Slot array, allocating `qset` empty slots if absent
    pub fn slots_or_allocate(
        &mut self,
        qset: usize,
        budget: &mut AllocationBudget,
    ) -> Result<&mut [Option<Quantum>]> {
        let slots = match self.data.take() {
            Some(slots) => slots,
            None => Self::allocate_slots(qset, budget)?,
        };
        Ok(&mut **self.data.insert(slots))
    }

    pub fn next(&self) -> Option<&QuantumSet> {
        self.next.as_deref()
    }

    fn allocate_slots(
        qset: usize,
        budget: &mut AllocationBudget,
    ) -> Result<Box<[Option<Quantum>]>> {
        let bytes = qset.saturating_mul(SLOT_BYTES);
        budget.charge("slot array", bytes)?;

        let mut slots = Vec::new();
        if slots.try_reserve_exact(qset).is_err() {
            budget.refund(bytes);
            return Err(ScullError::OutOfMemory {
                what: "slot array",
                bytes,
            });
        }
        slots.resize_with(qset, || None);

        Ok(slots.into_boxed_slice())
    }
}

// =============================================================================
// List Traversal
// =============================================================================

/// Return the node behind `link`, allocating it if the link is empty.
fn ensure<'a>(
    link: &'a mut Option<Box<QuantumSet>>,
    budget: &mut AllocationBudget,
) -> Result<&'a mut QuantumSet> {
    let node = match link.take() {
        Some(node) => node,
        None => QuantumSet::allocate(budget)?,
    };
    Ok(&mut **link.insert(node))
}

/// Walk to node `item`, growing the list one node at a time as needed.
///
/// Best-effort growth, never retracts: if an allocation fails part way,
/// the nodes already linked stay in the list. Absent children are legal,
/// so the list is still well formed.
pub fn follow<'a>(
    head: &'a mut Option<Box<QuantumSet>>,
    item: u64,
    budget: &mut AllocationBudget,
) -> Result<&'a mut QuantumSet> {
    let mut node = ensure(head, budget)?;
    for _ in 0..item {
        node = ensure(&mut node.next, budget)?;
    }
    Ok(node)
}

/// Walk to node `item` without allocating. `None` means a hole.
pub fn find(head: Option<&QuantumSet>, item: u64) -> Option<&QuantumSet> {
    let mut node = head?;
    for _ in 0..item {
        node = node.next.as_deref()?;
    }
    Some(node)
}

/// Iterate over the nodes of a list
pub fn iter(head: Option<&QuantumSet>) -> impl Iterator<Item = &QuantumSet> {
    std::iter::successors(head, |node| node.next())
}

/// Free a whole list, one node at a time.
///
/// Returns the number of nodes released.
pub fn release(head: Option<Box<QuantumSet>>) -> usize {
    let mut released = 0;
    let mut cur = head;
    while let Some(mut node) = cur {
        // unlink first so dropping the node never recurses down the list
        cur = node.next.take();
        released += 1;
    }
    released
}
