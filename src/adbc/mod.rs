//! Driver, database and connection objects of the ADBC object model.
//!
//! Each object is a framework wrapper around a driver-supplied implementation
//! of an extension trait:
//! - [`Driver`] over [`DriverImpl`] - metadata and database factory
//! - [`Database`] over [`DatabaseImpl`] - options and connection factory
//! - [`Connection`] over [`ConnectionImpl`] - lifecycle, transactions,
//!   options and catalog introspection
//!
//! The wrappers own the shared protocol semantics (state checks, option
//! negotiation, error messages); the traits only carry database-specific
//! behaviour and every hook has a default body.
//!
//! # Example
//!
//! ```
//! use adbc_driver_kit::adbc::Driver;
//! use adbc_driver_kit::memory::MemoryDriver;
//!
//! # fn example() -> adbc_driver_kit::error::Result<()> {
//! let driver: Driver<MemoryDriver> = Driver::new();
//! let mut database = driver.new_database()?;
//! database.init()?;
//!
//! let mut connection = database.connect()?;
//! assert!(connection.autocommit());
//! connection.release()?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod database;
pub mod driver;

pub use connection::{Connection, ConnectionImpl};
pub use database::{Database, DatabaseImpl};
pub use driver::{Driver, DriverConfig, DriverConfigBuilder, DriverImpl};

use std::fmt;

/// Lifecycle shared by databases and connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, options may be set, not yet initialized
    Uninitialized,
    /// Initialized and usable
    Ready,
    /// Released; every further operation fails
    Released,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Uninitialized => write!(f, "uninitialized"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Released => write!(f, "released"),
        }
    }
}
