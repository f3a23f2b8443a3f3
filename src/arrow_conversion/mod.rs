//! Arrow structures produced by connection metadata operations.
//!
//! This module holds the fixed schemas of `GetObjects`, `GetInfo` and
//! `GetTableTypes`, the conversion of in-memory results into record batches,
//! and the owned stream type handed to callers.

pub mod info;
pub mod objects;
pub mod stream;

pub use info::{get_info_schema, get_table_types_schema, info_to_batch, InfoValue};
pub use objects::{get_objects_schema, objects_to_batch};
pub use stream::{BatchReader, StreamSlot};
