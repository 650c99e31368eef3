//! Configuration for scull
//!
//! Centralized configuration with the classic scull defaults.

use std::time::Duration;

use crate::error::{Result, ScullError};

/// Default size of a quantum (bytes)
pub const DEFAULT_QUANTUM: usize = 4000;

/// Default number of quantum slots per qset node
pub const DEFAULT_QSET: usize = 1000;

/// Default number of devices in a [`DeviceSet`](crate::device::DeviceSet)
pub const DEFAULT_DEVICE_COUNT: usize = 4;

/// Main configuration for a scull store or device set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------
    /// Size of each quantum buffer in bytes.
    /// Restored on every trim.
    pub quantum: usize,

    /// Number of quantum slots in each qset node.
    /// Restored on every trim.
    pub qset: usize,

    // -------------------------------------------------------------------------
    // Device Configuration
    // -------------------------------------------------------------------------
    /// Number of devices (minor numbers 0..device_count)
    pub device_count: usize,

    // -------------------------------------------------------------------------
    // Memory Configuration
    // -------------------------------------------------------------------------
    /// Per-store allocation budget in bytes (None = unlimited).
    /// Nodes, slot arrays and quanta are all charged against it.
    pub memory_limit: Option<usize>,

    // -------------------------------------------------------------------------
    // Locking Configuration
    // -------------------------------------------------------------------------
    /// How often a blocked interruptible acquire re-checks its interrupt (milliseconds)
    pub lock_poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            qset: DEFAULT_QSET,
            device_count: DEFAULT_DEVICE_COUNT,
            memory_limit: None,
            lock_poll_interval_ms: 10,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Bytes addressed by one qset node (`quantum * qset`)
    pub fn item_size(&self) -> usize {
        self.quantum * self.qset
    }

    /// Poll interval as a `Duration`
    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }

    /// Check the whole configuration, device count included
    pub fn validate(&self) -> Result<()> {
        self.validate_geometry()?;
        if self.device_count == 0 {
            return Err(ScullError::Config("device_count must be positive".to_string()));
        }
        Ok(())
    }

    /// Check only what a single store needs: geometry and lock polling
    pub fn validate_geometry(&self) -> Result<()> {
        if self.quantum == 0 {
            return Err(ScullError::Config("quantum must be positive".to_string()));
        }
        if self.qset == 0 {
            return Err(ScullError::Config("qset must be positive".to_string()));
        }
        if self.quantum.checked_mul(self.qset).is_none() {
            return Err(ScullError::Config(format!(
                "quantum ({}) * qset ({}) overflows",
                self.quantum, self.qset
            )));
        }
        if self.lock_poll_interval_ms == 0 {
            return Err(ScullError::Config(
                "lock_poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the quantum size (in bytes)
    pub fn quantum(mut self, quantum: usize) -> Self {
        self.config.quantum = quantum;
        self
    }

    /// Set the number of slots per qset node
    pub fn qset(mut self, qset: usize) -> Self {
        self.config.qset = qset;
        self
    }

    /// Set the number of devices
    pub fn device_count(mut self, count: usize) -> Self {
        self.config.device_count = count;
        self
    }

    /// Cap the bytes each store may allocate
    pub fn memory_limit(mut self, bytes: usize) -> Self {
        self.config.memory_limit = Some(bytes);
        self
    }

    /// Set the interrupt poll interval (in milliseconds)
    pub fn lock_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.lock_poll_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
