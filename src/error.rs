//! Error types for scull
//!
//! Provides a unified error type for all store and device operations.

use std::io;

use thiserror::Error;

/// Result type alias using ScullError
pub type Result<T> = std::result::Result<T, ScullError>;

/// Unified error type for scull operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScullError {
    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    /// Waiting for the store guard was cancelled. Nothing was changed.
    #[error("Interrupted while waiting for the store lock")]
    Interrupted,

    // -------------------------------------------------------------------------
    // Allocation Errors
    // -------------------------------------------------------------------------
    #[error("Out of memory allocating {what} ({bytes} bytes)")]
    OutOfMemory { what: &'static str, bytes: usize },

    // -------------------------------------------------------------------------
    // Transfer Errors
    // -------------------------------------------------------------------------
    /// The caller's buffer could not supply (or receive) the requested bytes.
    #[error("Bad address: transfer of {requested} bytes with a {available}-byte buffer")]
    IoFault { requested: usize, available: usize },

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No such device: minor {minor} (device count {count})")]
    NoSuchDevice { minor: usize, count: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScullError {
    /// Negative errno a device-file caller would observe for this error.
    pub fn errno(&self) -> i32 {
        match self {
            ScullError::Interrupted => -512, // ERESTARTSYS
            ScullError::OutOfMemory { .. } => -12,
            ScullError::IoFault { .. } => -14,
            ScullError::InvalidArgument(_) | ScullError::Config(_) => -22,
            ScullError::NoSuchDevice { .. } => -19,
        }
    }
}

impl From<ScullError> for io::Error {
    fn from(err: ScullError) -> Self {
        let kind = match err {
            ScullError::Interrupted => io::ErrorKind::Interrupted,
            ScullError::OutOfMemory { .. } => io::ErrorKind::OutOfMemory,
            ScullError::IoFault { .. } | ScullError::InvalidArgument(_) => {
                io::ErrorKind::InvalidInput
            }
            ScullError::NoSuchDevice { .. } => io::ErrorKind::NotFound,
            ScullError::Config(_) => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}
