//! Device Module
//!
//! File-style access to a set of scull stores.
//!
//! ## Responsibilities
//! - Own one store per minor number
//! - Open handles (trimming on write-only open)
//! - Track per-handle position and interrupt token
//! - Log device lifecycle

mod file;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Result, ScullError};
use crate::interrupt::Interrupt;
use crate::store::Store;

pub use file::DeviceFile;

/// Access mode an open handle was requested with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    /// Opening write-only truncates the device to zero length
    WriteOnly,
    ReadWrite,
}

/// A fixed set of scull devices
pub struct DeviceSet {
    config: Config,
    devices: Vec<Arc<Store>>,
}

impl DeviceSet {
    /// Create `config.device_count` empty devices
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let mut devices = Vec::with_capacity(config.device_count);
        for minor in 0..config.device_count {
            devices.push(Arc::new(Store::new(config.clone())?));
            tracing::info!(minor, "scull device added");
        }

        Ok(Self { config, devices })
    }

    /// Open device `minor` with a fresh interrupt token
    pub fn open(&self, minor: usize, mode: AccessMode) -> Result<DeviceFile> {
        self.open_with_interrupt(minor, mode, Interrupt::new())
    }

    /// Open device `minor`; `interrupt` can cancel any wait on its lock,
    /// including the trim done by a write-only open.
    pub fn open_with_interrupt(
        &self,
        minor: usize,
        mode: AccessMode,
        interrupt: Interrupt,
    ) -> Result<DeviceFile> {
        let store = self.device(minor)?;

        if mode == AccessMode::WriteOnly {
            store.lock_interruptible(&interrupt)?.trim();
        }

        tracing::debug!(minor, ?mode, "scull device opened");
        Ok(DeviceFile::new(minor, mode, store, interrupt))
    }

    /// The store behind device `minor`
    pub fn device(&self, minor: usize) -> Result<Arc<Store>> {
        self.devices
            .get(minor)
            .cloned()
            .ok_or(ScullError::NoSuchDevice {
                minor,
                count: self.devices.len(),
            })
    }

    /// Number of devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for DeviceSet {
    fn drop(&mut self) {
        for store in &self.devices {
            store.trim();
        }
        tracing::info!(devices = self.devices.len(), "scull cleanup");
    }
}
