//! ADBC FFI-compatible trait implementations.
//!
//! This module provides wrapper types that implement the `adbc_core` traits
//! on top of the framework objects, so any [`DriverImpl`] can be exported as
//! a C-compatible shared library through `adbc_ffi::export_driver!`.
//!
//! Framework statuses are converted into `adbc_core` errors exactly once, here,
//! keeping kind, message, vendor code and SQLSTATE.
//!
//! # FFI Export
//!
//! When built with `--features ffi`, the library exports the in-memory
//! reference driver with the entry point `AdbcDriverKitMemoryInit`.
//!
//! ```bash
//! cargo build --release --features ffi
//! ```
//!
//! ## Using with ADBC Driver Manager (Rust)
//!
//! ```rust,ignore
//! use adbc_core::options::{AdbcVersion, ObjectDepth, OptionDatabase, OptionValue};
//! use adbc_core::{Connection, Database, Driver};
//! use adbc_driver_manager::ManagedDriver;
//!
//! let mut driver = ManagedDriver::load_dynamic_from_filename(
//!     "target/release/libadbc_driver_kit.so",
//!     Some(b"AdbcDriverKitMemoryInit"),
//!     AdbcVersion::V110,
//! )?;
//!
//! let catalog = r#"{"catalogs": [{"name": "main"}]}"#;
//! let opts = vec![(
//!     OptionDatabase::Other("adbc.memory.catalog".into()),
//!     OptionValue::String(catalog.into()),
//! )];
//! let db = driver.new_database_with_opts(opts)?;
//! let conn = db.new_connection()?;
//! let reader = conn.get_objects(ObjectDepth::Catalogs, None, None, None, None, None)?;
//! ```
//!
//! ## Supported ADBC Features
//!
//! | Feature | Status |
//! |---------|--------|
//! | `get_objects` | Supported |
//! | `get_info` | Supported (all codes are returned) |
//! | `get_table_types` / `get_table_schema` | Supported |
//! | `commit` / `rollback` / autocommit | Supported |
//! | Statements | Not supported |
//! | Statistics, partitions, cancel | Not supported |

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use adbc_core::error::{Error as AdbcError, Result as AdbcResult, Status as AdbcStatus};
use adbc_core::options::{
    InfoCode, ObjectDepth as AdbcObjectDepth, OptionConnection, OptionDatabase, OptionStatement,
    OptionValue as AdbcOptionValue,
};
use adbc_core::{Optionable, PartitionedResult};
use arrow::array::{RecordBatch, RecordBatchReader};
use arrow_schema::Schema;

use crate::adbc::{Connection, ConnectionImpl, Database, DatabaseImpl, Driver, DriverImpl};
use crate::arrow_conversion::{BatchReader, StreamSlot};
use crate::catalog::{CatalogFilter, ObjectDepth};
use crate::error::{Result, Status};
use crate::memory::MemoryDriver;
use crate::options::OptionValue;

type DatabaseOf<D> = <D as DriverImpl>::Database;
type ConnectionOf<D> = <DatabaseOf<D> as DatabaseImpl>::Connection;

fn not_supported(what: &str) -> AdbcError {
    AdbcError::with_message_and_status(format!("{} is not supported", what), AdbcStatus::NotImplemented)
}

/// Unwrap a filled output slot into the reader handed across the ABI.
fn take_stream(mut slot: StreamSlot) -> Result<BatchReader> {
    slot.take()
        .ok_or_else(|| Status::internal("Operation succeeded without producing a stream"))
}

fn option_string(value: OptionValue, key: &str) -> Result<String> {
    match value {
        OptionValue::Absent => Err(Status::not_found(format!("Option {} is not set", key))),
        OptionValue::Bool(b) => Ok(b.to_string()),
        other => other.as_str().map(str::to_string),
    }
}

fn option_absent(value: OptionValue, key: &str) -> Result<OptionValue> {
    if value.is_absent() {
        Err(Status::not_found(format!("Option {} is not set", key)))
    } else {
        Ok(value)
    }
}

// -----------------------------------------------------------------------------
// FFI Driver
// -----------------------------------------------------------------------------

/// FFI-compatible ADBC Driver wrapper around a framework [`Driver`].
pub struct FfiDriver<D: DriverImpl> {
    driver: Driver<D>,
}

impl<D: DriverImpl> Default for FfiDriver<D> {
    fn default() -> Self {
        Self {
            driver: Driver::new(),
        }
    }
}

impl<D: DriverImpl> adbc_core::Driver for FfiDriver<D> {
    type DatabaseType = FfiDatabase<D>;

    fn new_database(&mut self) -> AdbcResult<Self::DatabaseType> {
        self.new_database_with_opts(std::iter::empty())
    }

    fn new_database_with_opts(
        &mut self,
        opts: impl IntoIterator<Item = (OptionDatabase, AdbcOptionValue)>,
    ) -> AdbcResult<Self::DatabaseType> {
        let mut database = self.driver.new_database()?;
        for (key, value) in opts {
            database.set_option(key.as_ref(), OptionValue::from(value))?;
        }
        database.init()?;
        Ok(FfiDatabase { database })
    }
}

// -----------------------------------------------------------------------------
// FFI Database
// -----------------------------------------------------------------------------

/// FFI-compatible ADBC Database wrapper. Always initialized.
pub struct FfiDatabase<D: DriverImpl> {
    database: Database<DatabaseOf<D>>,
}

impl<D: DriverImpl> Optionable for FfiDatabase<D> {
    type Option = OptionDatabase;

    fn set_option(&mut self, key: Self::Option, value: AdbcOptionValue) -> AdbcResult<()> {
        Ok(self
            .database
            .set_option(key.as_ref(), OptionValue::from(value))?)
    }

    fn get_option_string(&self, key: Self::Option) -> AdbcResult<String> {
        let value = self.database.get_option(key.as_ref())?;
        Ok(option_string(value, key.as_ref())?)
    }

    fn get_option_bytes(&self, key: Self::Option) -> AdbcResult<Vec<u8>> {
        let value = option_absent(self.database.get_option(key.as_ref())?, key.as_ref())?;
        Ok(value.as_bytes()?.to_vec())
    }

    fn get_option_int(&self, key: Self::Option) -> AdbcResult<i64> {
        let value = option_absent(self.database.get_option(key.as_ref())?, key.as_ref())?;
        Ok(value.as_int()?)
    }

    fn get_option_double(&self, key: Self::Option) -> AdbcResult<f64> {
        let value = option_absent(self.database.get_option(key.as_ref())?, key.as_ref())?;
        Ok(value.as_double()?)
    }
}

impl<D: DriverImpl> adbc_core::Database for FfiDatabase<D> {
    type ConnectionType = FfiConnection<D>;

    fn new_connection(&self) -> AdbcResult<Self::ConnectionType> {
        self.new_connection_with_opts(std::iter::empty())
    }

    fn new_connection_with_opts(
        &self,
        opts: impl IntoIterator<Item = (OptionConnection, AdbcOptionValue)>,
    ) -> AdbcResult<Self::ConnectionType> {
        let mut connection = self.database.new_connection()?;
        for (key, value) in opts {
            connection.set_option(key.as_ref(), OptionValue::from(value))?;
        }
        connection.init(&self.database)?;
        Ok(FfiConnection {
            connection: RefCell::new(connection),
        })
    }
}

// -----------------------------------------------------------------------------
// FFI Connection
// -----------------------------------------------------------------------------

/// FFI-compatible ADBC Connection wrapper.
///
/// `adbc_core` exposes metadata calls through `&self`; the framework
/// connection is kept in a `RefCell` so those calls can reach the driver's
/// `&mut self` hooks.
pub struct FfiConnection<D: DriverImpl> {
    connection: RefCell<Connection<ConnectionOf<D>>>,
}

impl<D: DriverImpl> FfiConnection<D> {
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection<ConnectionOf<D>>) -> Result<T>,
    ) -> AdbcResult<T> {
        let mut connection = self
            .connection
            .try_borrow_mut()
            .map_err(|_| Status::internal("Connection is already in use"))?;
        Ok(f(&mut *connection)?)
    }

    fn get_option_value(&self, key: &OptionConnection) -> AdbcResult<OptionValue> {
        let value = self.with_connection(|c| c.get_option(key.as_ref()))?;
        Ok(option_absent(value, key.as_ref())?)
    }
}

impl<D: DriverImpl> Optionable for FfiConnection<D> {
    type Option = OptionConnection;

    fn set_option(&mut self, key: Self::Option, value: AdbcOptionValue) -> AdbcResult<()> {
        Ok(self
            .connection
            .get_mut()
            .set_option(key.as_ref(), OptionValue::from(value))?)
    }

    fn get_option_string(&self, key: Self::Option) -> AdbcResult<String> {
        let value = self.get_option_value(&key)?;
        Ok(option_string(value, key.as_ref())?)
    }

    fn get_option_bytes(&self, key: Self::Option) -> AdbcResult<Vec<u8>> {
        Ok(self.get_option_value(&key)?.as_bytes()?.to_vec())
    }

    fn get_option_int(&self, key: Self::Option) -> AdbcResult<i64> {
        Ok(self.get_option_value(&key)?.as_int()?)
    }

    fn get_option_double(&self, key: Self::Option) -> AdbcResult<f64> {
        Ok(self.get_option_value(&key)?.as_double()?)
    }
}

impl<D: DriverImpl> adbc_core::Connection for FfiConnection<D> {
    type StatementType = FfiStatement;

    fn new_statement(&mut self) -> AdbcResult<Self::StatementType> {
        let connection = self.connection.get_mut();
        if connection.state() != crate::adbc::LifecycleState::Ready {
            return Err(Status::invalid_state(format!(
                "{} Connection is not ready",
                connection.config().error_prefix()
            ))
            .into());
        }
        Ok(FfiStatement::new(connection.config().error_prefix()))
    }

    fn cancel(&mut self) -> AdbcResult<()> {
        Ok(self.connection.get_mut().cancel()?)
    }

    fn get_info(
        &self,
        codes: Option<HashSet<InfoCode>>,
    ) -> AdbcResult<impl RecordBatchReader + Send> {
        let codes: Vec<u32> = codes
            .map(|codes| codes.iter().map(u32::from).collect())
            .unwrap_or_default();
        self.with_connection(|c| {
            let mut slot = StreamSlot::new();
            c.get_info(&codes, Some(&mut slot))?;
            take_stream(slot)
        })
    }

    fn get_objects(
        &self,
        depth: AdbcObjectDepth,
        catalog: Option<&str>,
        db_schema: Option<&str>,
        table_name: Option<&str>,
        table_type: Option<Vec<&str>>,
        column_name: Option<&str>,
    ) -> AdbcResult<impl RecordBatchReader + Send> {
        let filter = CatalogFilter {
            catalog: catalog.map(str::to_string),
            db_schema: db_schema.map(str::to_string),
            table_name: table_name.map(str::to_string),
            column_name: column_name.map(str::to_string),
            table_types: table_type.map(|types| types.into_iter().map(str::to_string).collect()),
        };
        let depth = ObjectDepth::from(depth).code();
        self.with_connection(|c| {
            let mut slot = StreamSlot::new();
            c.get_objects(depth, &filter, Some(&mut slot))?;
            take_stream(slot)
        })
    }

    fn get_table_schema(
        &self,
        catalog: Option<&str>,
        db_schema: Option<&str>,
        table_name: &str,
    ) -> AdbcResult<Schema> {
        self.with_connection(|c| c.get_table_schema(catalog, db_schema, table_name))
    }

    fn get_table_types(&self) -> AdbcResult<impl RecordBatchReader + Send> {
        self.with_connection(|c| {
            let mut slot = StreamSlot::new();
            c.get_table_types(Some(&mut slot))?;
            take_stream(slot)
        })
    }

    fn get_statistic_names(&self) -> AdbcResult<impl RecordBatchReader + Send> {
        self.with_connection(|c| c.get_statistic_names())
    }

    fn get_statistics(
        &self,
        catalog: Option<&str>,
        db_schema: Option<&str>,
        table_name: Option<&str>,
        approximate: bool,
    ) -> AdbcResult<impl RecordBatchReader + Send> {
        self.with_connection(|c| c.get_statistics(catalog, db_schema, table_name, approximate))
    }

    fn commit(&mut self) -> AdbcResult<()> {
        Ok(self.connection.get_mut().commit()?)
    }

    fn rollback(&mut self) -> AdbcResult<()> {
        Ok(self.connection.get_mut().rollback()?)
    }

    fn read_partition(
        &self,
        partition: impl AsRef<[u8]>,
    ) -> AdbcResult<impl RecordBatchReader + Send> {
        self.with_connection(|c| c.read_partition(partition.as_ref()))
    }
}

// -----------------------------------------------------------------------------
// FFI Statement
// -----------------------------------------------------------------------------

/// FFI-compatible ADBC Statement. Query execution is not part of this
/// framework: options and SQL text are stored, every execution path reports
/// `NotImplemented`.
pub struct FfiStatement {
    error_prefix: String,
    sql: Option<String>,
    options: HashMap<String, OptionValue>,
}

impl FfiStatement {
    fn new(error_prefix: &str) -> Self {
        Self {
            error_prefix: error_prefix.to_string(),
            sql: None,
            options: HashMap::new(),
        }
    }

    fn unsupported(&self, what: &str) -> AdbcError {
        not_supported(&format!("{} {}", self.error_prefix, what))
    }

    fn stored(&self, key: &OptionStatement) -> Result<&OptionValue> {
        self.options
            .get(key.as_ref())
            .ok_or_else(|| Status::not_found(format!("Option {} is not set", key.as_ref())))
    }
}

impl Optionable for FfiStatement {
    type Option = OptionStatement;

    fn set_option(&mut self, key: Self::Option, value: AdbcOptionValue) -> AdbcResult<()> {
        self.options
            .insert(key.as_ref().to_string(), OptionValue::from(value));
        Ok(())
    }

    fn get_option_string(&self, key: Self::Option) -> AdbcResult<String> {
        let value = self.stored(&key)?.clone();
        Ok(option_string(value, key.as_ref())?)
    }

    fn get_option_bytes(&self, key: Self::Option) -> AdbcResult<Vec<u8>> {
        Ok(self.stored(&key)?.as_bytes()?.to_vec())
    }

    fn get_option_int(&self, key: Self::Option) -> AdbcResult<i64> {
        Ok(self.stored(&key)?.as_int()?)
    }

    fn get_option_double(&self, key: Self::Option) -> AdbcResult<f64> {
        Ok(self.stored(&key)?.as_double()?)
    }
}

impl adbc_core::Statement for FfiStatement {
    fn bind(&mut self, _batch: RecordBatch) -> AdbcResult<()> {
        Err(self.unsupported("Bind"))
    }

    fn bind_stream(&mut self, _reader: Box<dyn RecordBatchReader + Send>) -> AdbcResult<()> {
        Err(self.unsupported("BindStream"))
    }

    fn execute(&mut self) -> AdbcResult<impl RecordBatchReader + Send> {
        Err::<BatchReader, _>(self.unsupported("Query execution"))
    }

    fn execute_update(&mut self) -> AdbcResult<Option<i64>> {
        Err(self.unsupported("Query execution"))
    }

    fn execute_schema(&mut self) -> AdbcResult<Schema> {
        Err(self.unsupported("ExecuteSchema"))
    }

    fn execute_partitions(&mut self) -> AdbcResult<PartitionedResult> {
        Err(self.unsupported("Partitioned execution"))
    }

    fn get_parameter_schema(&self) -> AdbcResult<Schema> {
        Err(self.unsupported("GetParameterSchema"))
    }

    fn prepare(&mut self) -> AdbcResult<()> {
        Err(self.unsupported("Prepare"))
    }

    fn set_sql_query(&mut self, query: impl AsRef<str>) -> AdbcResult<()> {
        self.sql = Some(query.as_ref().to_string());
        Ok(())
    }

    fn set_substrait_plan(&mut self, _plan: impl AsRef<[u8]>) -> AdbcResult<()> {
        Err(self.unsupported("Substrait plans"))
    }

    fn cancel(&mut self) -> AdbcResult<()> {
        Err(self.unsupported("Cancel"))
    }
}

// -----------------------------------------------------------------------------
// FFI Export
// -----------------------------------------------------------------------------

/// The in-memory reference driver as exported over the C ABI.
pub type FfiMemoryDriver = FfiDriver<MemoryDriver>;

adbc_ffi::export_driver!(AdbcDriverKitMemoryInit, FfiMemoryDriver);
