//! # scull
//!
//! An in-memory "Simple Character Utility for Loading Localities":
//! - Sparse, lazily grown storage in fixed-size quanta
//! - Two-level index (qset list → slot array → quantum)
//! - One guard per store, interruptible while waiting
//! - File-style handles with read/write/seek
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DeviceSet                              │
//! │              (minor 0..n, open / release)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  DeviceFile (position, interrupt)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Store                                 │
//! │             (Mutex, read / write / trim)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!   ┌───────────┐    ┌───────────┐
//!   │ QuantumSet│───►│ QuantumSet│───► ...
//!   └─────┬─────┘    └───────────┘
//!         ▼
//!   [quantum][hole][quantum] ...
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod interrupt;
pub mod qset;
pub mod seek;
pub mod store;
pub mod device;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, ScullError};
pub use config::Config;
pub use interrupt::Interrupt;
pub use seek::Whence;
pub use store::{Store, StoreGuard, StoreStats};
pub use device::{AccessMode, DeviceFile, DeviceSet};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of scull
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
