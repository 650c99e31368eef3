//! Address translation
//!
//! Maps a linear byte offset onto the two-level qset/quantum index.

/// Location of a byte offset inside the qset list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Index of the qset node in the list (0-based)
    pub item: u64,

    /// Index of the quantum within that node's slot array (`< qset`)
    pub slot: usize,

    /// Byte offset inside the quantum (`< quantum`)
    pub offset: usize,
}

impl Position {
    /// Translate `pos` for the given geometry.
    ///
    /// ```text
    /// itemsize = quantum * qset
    /// item     = pos / itemsize
    /// rest     = pos % itemsize
    /// slot     = rest / quantum
    /// offset   = rest % quantum
    /// ```
    ///
    /// Both `quantum` and `qset` must be positive.
    #[inline]
    pub fn translate(pos: u64, quantum: usize, qset: usize) -> Self {
        debug_assert!(quantum > 0 && qset > 0);
        let item_size = Self::item_size(quantum, qset);
        let quantum = quantum as u64;

        let item = pos / item_size;
        let rest = pos % item_size;

        Self {
            item,
            // rest < quantum * qset, so both fit back into usize
            slot: (rest / quantum) as usize,
            offset: (rest % quantum) as usize,
        }
    }

    /// Bytes covered by one qset node
    #[inline]
    pub fn item_size(quantum: usize, qset: usize) -> u64 {
        quantum as u64 * qset as u64
    }

    /// Bytes left in this quantum from `offset` onward
    #[inline]
    pub fn quantum_remaining(&self, quantum: usize) -> usize {
        quantum - self.offset
    }
}
