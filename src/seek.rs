//! Seek arithmetic
//!
//! Stateless position bookkeeping. Touches neither the guard nor the
//! structure; the next read or write consumes the result.

use crate::error::{Result, ScullError};

/// Origin of a seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute position (SEEK_SET)
    Set,
    /// Relative to the current position (SEEK_CUR)
    Cur,
    /// Relative to the store size (SEEK_END)
    End,
}

impl TryFrom<i32> for Whence {
    type Error = ScullError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Whence::Set),
            1 => Ok(Whence::Cur),
            2 => Ok(Whence::End),
            other => Err(ScullError::InvalidArgument(format!("unknown whence {}", other))),
        }
    }
}

/// Compute the position a seek lands on.
///
/// Fails with `InvalidArgument` if the result would be negative (or does not
/// fit in a file position).
pub fn seek(current: u64, offset: i64, whence: Whence, size: u64) -> Result<u64> {
    let base = match whence {
        Whence::Set => 0,
        Whence::Cur => current,
        Whence::End => size,
    };

    let new_pos = i128::from(base) + i128::from(offset);
    if new_pos < 0 {
        return Err(ScullError::InvalidArgument(format!(
            "seek to negative position {}",
            new_pos
        )));
    }

    u64::try_from(new_pos)
        .map_err(|_| ScullError::InvalidArgument(format!("seek position {} overflows", new_pos)))
}
