//! # adbc-driver-kit
//!
//! Framework for building ADBC (Arrow Database Connectivity) drivers.
//!
//! A driver author implements a handful of extension traits
//! ([`DriverImpl`], [`DatabaseImpl`], [`ConnectionImpl`], [`CatalogCursor`])
//! and gets the shared protocol semantics for free: the connection lifecycle
//! and transaction state machine, option negotiation with canonical error
//! messages, and a `GetObjects` builder that turns a pull-style catalog cursor
//! into the nested Arrow result ADBC clients expect.
//!
//! An in-memory reference driver ([`memory::MemoryDriver`]) serves catalog
//! metadata from a JSON document and is exported over the C ABI with the
//! `ffi` feature.
//!
//! ## Example
//!
//! ```
//! use adbc_driver_kit::{CatalogFilter, Driver, MemoryDriver, StreamSlot};
//! use arrow::record_batch::RecordBatchReader;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut database = Driver::<MemoryDriver>::new().new_database()?;
//! database.set_option(
//!     "adbc.memory.catalog",
//!     r#"{"catalogs": [{"name": "main", "schemas": [{"name": "public"}]}]}"#,
//! )?;
//! database.init()?;
//!
//! let mut connection = database.connect()?;
//!
//! // Catalogs and schemas only
//! let mut out = StreamSlot::new();
//! connection.get_objects(2, &CatalogFilter::new(), Some(&mut out))?;
//!
//! let reader = out.take().ok_or("no stream")?;
//! assert_eq!(reader.schema().field(0).name(), "catalog_name");
//! for batch in reader {
//!     println!("Catalogs: {}", batch?.num_rows());
//! }
//!
//! connection.release()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// Module declarations
pub mod adbc;
pub mod arrow_conversion;
pub mod catalog;
pub mod error;
pub mod memory;
pub mod options;

// FFI module for C-compatible ADBC export (conditionally compiled)
#[cfg(feature = "ffi")]
pub mod adbc_ffi;

// Re-export public API
pub use adbc::{
    Connection, ConnectionImpl, Database, DatabaseImpl, Driver, DriverConfig, DriverImpl,
    LifecycleState,
};
pub use arrow_conversion::{BatchReader, StreamSlot};
pub use catalog::{CatalogCursor, CatalogFilter, ObjectDepth};
pub use error::{Result, Status, StatusKind};
pub use memory::MemoryDriver;
pub use options::OptionValue;

// Re-export FFI types when ffi feature is enabled
#[cfg(feature = "ffi")]
pub use adbc_ffi::{FfiConnection, FfiDatabase, FfiDriver, FfiMemoryDriver, FfiStatement};
