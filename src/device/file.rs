//! Open device handle
//!
//! Carries the file position and forwards each call to the store under its
//! interruptible guard.

use std::io;
use std::sync::Arc;

use crate::error::Result;
use crate::interrupt::Interrupt;
use crate::seek::{self, Whence};
use crate::store::Store;

use super::AccessMode;

/// An open scull device
pub struct DeviceFile {
    minor: usize,
    mode: AccessMode,
    store: Arc<Store>,

    /// Current file position
    pos: u64,

    /// Cancels waits on the store lock
    interrupt: Interrupt,
}

impl DeviceFile {
    pub(super) fn new(
        minor: usize,
        mode: AccessMode,
        store: Arc<Store>,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            minor,
            mode,
            store,
            pos: 0,
            interrupt,
        }
    }

    /// Read at most one quantum's worth into `buf`. 0 means end of data or a hole.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let count = buf.len();
        self.read_count(buf, count)
    }

    /// Read with an explicit byte count; `buf` shorter than the transfer is a fault.
    pub fn read_count(&mut self, buf: &mut [u8], count: usize) -> Result<usize> {
        let mut guard = self.store.lock_interruptible(&self.interrupt)?;
        guard.read(&mut self.pos, buf, count)
    }

    /// Write at most to the end of the current quantum
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.write_count(buf, buf.len())
    }

    /// Write with an explicit byte count; `buf` shorter than the transfer is a fault.
    pub fn write_count(&mut self, buf: &[u8], count: usize) -> Result<usize> {
        let mut guard = self.store.lock_interruptible(&self.interrupt)?;
        guard.write(&mut self.pos, buf, count)
    }

    /// Move the file position. Never takes the store lock.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        self.pos = seek::seek(self.pos, offset, whence, self.store.size_hint())?;
        Ok(self.pos)
    }

    /// Close the handle. Nothing to do on the store side.
    pub fn release(self) {
        tracing::debug!(minor = self.minor, "scull device released");
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn minor(&self) -> usize {
        self.minor
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}

// =============================================================================
// std::io Adapters
// =============================================================================

impl io::Read for DeviceFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(DeviceFile::read(self, buf)?)
    }
}

impl io::Write for DeviceFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(DeviceFile::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for DeviceFile {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(offset) => {
                let offset = i64::try_from(offset).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset overflows")
                })?;
                (offset, Whence::Set)
            }
            io::SeekFrom::Current(offset) => (offset, Whence::Cur),
            io::SeekFrom::End(offset) => (offset, Whence::End),
        };
        Ok(DeviceFile::seek(self, offset, whence)?)
    }
}
