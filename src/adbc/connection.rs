//! ADBC Connection implementation.
//!
//! This module provides the `Connection` type, the lifecycle and transaction
//! state machine every driver shares, and the `ConnectionImpl` extension point
//! carrying the database-specific behaviour.

use crate::adbc::{Database, DatabaseImpl, DriverConfig, LifecycleState};
use crate::arrow_conversion::info::{
    info_to_batch, table_types_to_batch, InfoValue, INFO_DRIVER_NAME, INFO_DRIVER_VERSION,
    INFO_VENDOR_NAME,
};
use crate::arrow_conversion::{BatchReader, StreamSlot};
use crate::catalog::{self, builder::build_get_objects, CatalogCursor, CatalogFilter};
use crate::error::{Result, Status};
use crate::options::{
    OptionValue, CONNECTION_AUTOCOMMIT, CONNECTION_CURRENT_CATALOG, CONNECTION_CURRENT_DB_SCHEMA,
    VALUE_DISABLED, VALUE_ENABLED,
};
use arrow_schema::Schema;
use std::fmt;
use std::sync::Arc;

/// Cursor used when a driver does not provide catalog introspection; every
/// level reports `NotImplemented`.
struct UnsupportedCursor;

impl CatalogCursor for UnsupportedCursor {}

/// Extension point for a concrete connection.
///
/// Every hook has a default body. Hooks are only invoked once the framework
/// has validated lifecycle and transaction preconditions, so implementations
/// never re-check them.
pub trait ConnectionImpl {
    /// Parent database type, borrowed during [`ConnectionImpl::init`].
    type Database;

    fn init(&mut self, _database: &Self::Database) -> Result<()> {
        Ok(())
    }

    /// Whether the driver can leave autocommit mode. When `false`, changing
    /// autocommit fails with `NotImplemented` before any hook runs.
    fn supports_transactions(&self) -> bool {
        false
    }

    /// Switch between autocommit and manual transaction mode.
    ///
    /// Only called when the requested mode differs from the current one and
    /// the driver supports transactions.
    fn toggle_autocommit(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    /// Commit the current transaction and begin a new one.
    ///
    /// Only called when autocommit is disabled.
    fn commit(&mut self) -> Result<()> {
        Err(Status::not_implemented("Commit"))
    }

    /// Only called when autocommit is disabled.
    fn rollback(&mut self) -> Result<()> {
        Err(Status::not_implemented("Rollback"))
    }

    fn current_catalog(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn current_schema(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Handle a driver-specific option. Return `Ok(false)` for unknown keys.
    fn set_option(&mut self, _key: &str, _value: &OptionValue) -> Result<bool> {
        Ok(false)
    }

    /// Read a driver-specific option. Return `Ok(None)` for unknown keys.
    fn get_option(&self, _key: &str) -> Result<Option<OptionValue>> {
        Ok(None)
    }

    /// A fresh cursor for one `GetObjects` call.
    fn catalog_cursor(&mut self) -> Result<Box<dyn CatalogCursor + '_>> {
        Ok(Box::new(UnsupportedCursor))
    }

    fn get_table_schema(
        &mut self,
        _catalog: Option<&str>,
        _db_schema: Option<&str>,
        _table_name: &str,
    ) -> Result<Schema> {
        Err(Status::not_implemented("GetTableSchema"))
    }

    fn get_table_types(&mut self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// Driver-specific `GetInfo` values for the requested codes (all codes
    /// when `codes` is empty). Driver name and version are added by the
    /// framework.
    fn info(&self, _codes: &[u32]) -> Result<Vec<(u32, InfoValue)>> {
        Ok(Vec::new())
    }

    fn cancel(&mut self) -> Result<()> {
        Err(Status::not_implemented("Cancel"))
    }

    fn read_partition(&mut self, _partition: &[u8]) -> Result<BatchReader> {
        Err(Status::not_implemented("ReadPartition"))
    }

    fn get_statistics(
        &mut self,
        _catalog: Option<&str>,
        _db_schema: Option<&str>,
        _table_name: Option<&str>,
        _approximate: bool,
    ) -> Result<BatchReader> {
        Err(Status::not_implemented("GetStatistics"))
    }

    fn get_statistic_names(&mut self) -> Result<BatchReader> {
        Err(Status::not_implemented("GetStatisticNames"))
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// ADBC connection: lifecycle and transaction state machine over a
/// driver-supplied [`ConnectionImpl`].
///
/// A connection starts uninitialized in autocommit mode. Options may be
/// negotiated before [`Connection::init`]; every other operation requires the
/// connection to be ready. A released connection rejects everything.
///
/// Dropping a ready connection runs the release hook once.
///
/// # Example
///
/// ```
/// use adbc_driver_kit::adbc::Driver;
/// use adbc_driver_kit::memory::MemoryDriver;
///
/// # fn example() -> adbc_driver_kit::error::Result<()> {
/// let mut database = Driver::<MemoryDriver>::new().new_database()?;
/// database.init()?;
///
/// let mut connection = database.new_connection()?;
/// connection.set_option("adbc.connection.autocommit", "false")?;
/// connection.init(&database)?;
///
/// connection.commit()?;
/// connection.release()?;
/// # Ok(())
/// # }
/// ```
pub struct Connection<C: ConnectionImpl> {
    inner: C,
    state: LifecycleState,
    autocommit: bool,
    config: Arc<DriverConfig>,
}

impl<C: ConnectionImpl> Connection<C> {
    pub fn new(inner: C, config: Arc<DriverConfig>) -> Self {
        Self {
            inner,
            state: LifecycleState::Uninitialized,
            autocommit: true,
            config,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the connection is in autocommit mode.
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    fn prefix(&self) -> &str {
        self.config.error_prefix()
    }

    fn ensure_not_released(&self) -> Result<()> {
        if self.state == LifecycleState::Released {
            return Err(Status::invalid_state(format!(
                "{} Connection is released",
                self.prefix()
            )));
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            LifecycleState::Ready => Ok(()),
            LifecycleState::Uninitialized => Err(Status::invalid_state(format!(
                "{} Connection is not initialized",
                self.prefix()
            ))),
            LifecycleState::Released => Err(Status::invalid_state(format!(
                "{} Connection is released",
                self.prefix()
            ))),
        }
    }

    /// Initialize against a ready parent database.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the connection is uninitialized and the
    /// database ready; the driver's init error is returned verbatim and the
    /// connection stays uninitialized.
    pub fn init<D>(&mut self, database: &Database<D>) -> Result<()>
    where
        D: DatabaseImpl<Connection = C>,
        C: ConnectionImpl<Database = D>,
    {
        match self.state {
            LifecycleState::Uninitialized => {}
            LifecycleState::Ready => {
                return Err(Status::invalid_state(format!(
                    "{} Connection already initialized",
                    self.prefix()
                )))
            }
            LifecycleState::Released => self.ensure_not_released()?,
        }
        database.ensure_ready()?;
        self.inner.init(database.inner())?;
        self.state = LifecycleState::Ready;
        tracing::debug!(
            driver = %self.config.name(),
            autocommit = self.autocommit,
            "Connection initialized"
        );
        Ok(())
    }

    /// Set a connection option.
    ///
    /// `adbc.connection.autocommit` is handled by the framework: the driver's
    /// toggle hook runs only when the mode actually changes, and the mode
    /// flips only if the hook succeeds. Other keys go to the driver.
    pub fn set_option(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<()> {
        self.ensure_not_released()?;
        let value = value.into();

        if key == CONNECTION_AUTOCOMMIT {
            let enabled = value.as_bool()?;
            if enabled != self.autocommit {
                if !self.inner.supports_transactions() {
                    return Err(Status::not_implemented(format!(
                        "{} Cannot change autocommit",
                        self.prefix()
                    )));
                }
                self.inner.toggle_autocommit(enabled)?;
                self.autocommit = enabled;
                tracing::debug!(autocommit = enabled, "Transaction mode changed");
            }
            return Ok(());
        }

        if self.inner.set_option(key, &value)? {
            Ok(())
        } else {
            Err(Status::not_implemented(format!(
                "{} Unknown connection option {}={}",
                self.prefix(),
                key,
                value
            )))
        }
    }

    /// Read a connection option.
    ///
    /// The current catalog and schema read as [`OptionValue::Absent`] when the
    /// driver reports none.
    pub fn get_option(&self, key: &str) -> Result<OptionValue> {
        self.ensure_not_released()?;
        match key {
            CONNECTION_AUTOCOMMIT => Ok(OptionValue::from(if self.autocommit {
                VALUE_ENABLED
            } else {
                VALUE_DISABLED
            })),
            CONNECTION_CURRENT_CATALOG => Ok(self.inner.current_catalog()?.into()),
            CONNECTION_CURRENT_DB_SCHEMA => Ok(self.inner.current_schema()?.into()),
            _ => self.inner.get_option(key)?.ok_or_else(|| {
                Status::not_found(format!(
                    "{} Unknown connection option {}",
                    self.prefix(),
                    key
                ))
            }),
        }
    }

    pub fn commit(&mut self) -> Result<()> {
        self.ensure_ready()?;
        if self.autocommit {
            return Err(Status::invalid_state(format!(
                "{} No active transaction, cannot commit",
                self.prefix()
            )));
        }
        self.inner.commit()
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.ensure_ready()?;
        if self.autocommit {
            return Err(Status::invalid_state(format!(
                "{} No active transaction, cannot rollback",
                self.prefix()
            )));
        }
        self.inner.rollback()
    }

    /// Run `GetObjects` and place the result stream in `out`.
    ///
    /// # Arguments
    ///
    /// * `depth` - ADBC depth code (0 = all, 1 = catalogs, 2 = schemas,
    ///   3 = tables)
    /// * `filter` - patterns passed through to the driver's cursor
    /// * `out` - receives the stream on success; left untouched on failure
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown depth code or missing output,
    /// otherwise the first cursor failure verbatim (or the close failure if
    /// only closing failed).
    pub fn get_objects(
        &mut self,
        depth: i32,
        filter: &CatalogFilter,
        out: Option<&mut StreamSlot>,
    ) -> Result<()> {
        self.ensure_ready()?;
        let depth = catalog::parse_depth(depth, self.config.error_prefix())?;
        let out = out.ok_or_else(|| Status::invalid_argument("out must be non-null"))?;

        tracing::debug!(%depth, "GetObjects");
        let cursor = self.inner.catalog_cursor()?;
        let batch = build_get_objects(cursor, depth, filter)?;
        out.fill(BatchReader::single(batch));
        Ok(())
    }

    /// Run `GetInfo` for the requested codes (all when empty).
    pub fn get_info(&self, codes: &[u32], out: Option<&mut StreamSlot>) -> Result<()> {
        self.ensure_ready()?;
        let out = out.ok_or_else(|| Status::invalid_argument("out must be non-null"))?;

        let wanted = |code: u32| codes.is_empty() || codes.contains(&code);
        let mut values: Vec<(u32, InfoValue)> = [
            (INFO_VENDOR_NAME, self.config.vendor()),
            (INFO_DRIVER_NAME, self.config.name()),
            (INFO_DRIVER_VERSION, self.config.version()),
        ]
        .into_iter()
        .filter(|(code, _)| wanted(*code))
        .map(|(code, value)| (code, InfoValue::from(value)))
        .collect();

        for (code, value) in self.inner.info(codes)? {
            if !wanted(code) {
                continue;
            }
            match values.iter_mut().find(|(existing, _)| *existing == code) {
                Some(slot) => slot.1 = value,
                None => values.push((code, value)),
            }
        }

        out.fill(BatchReader::single(info_to_batch(&values)?));
        Ok(())
    }

    pub fn get_table_schema(
        &mut self,
        catalog: Option<&str>,
        db_schema: Option<&str>,
        table_name: &str,
    ) -> Result<Schema> {
        self.ensure_ready()?;
        if table_name.is_empty() {
            return Err(Status::invalid_argument(format!(
                "{} GetTableSchema: must provide table_name",
                self.prefix()
            )));
        }
        self.inner.get_table_schema(catalog, db_schema, table_name)
    }

    pub fn get_table_types(&mut self, out: Option<&mut StreamSlot>) -> Result<()> {
        self.ensure_ready()?;
        let out = out.ok_or_else(|| Status::invalid_argument("out must be non-null"))?;
        let table_types = self.inner.get_table_types()?;
        out.fill(BatchReader::single(table_types_to_batch(&table_types)?));
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.inner.cancel()
    }

    pub fn read_partition(&mut self, partition: &[u8]) -> Result<BatchReader> {
        self.ensure_ready()?;
        self.inner.read_partition(partition)
    }

    pub fn get_statistics(
        &mut self,
        catalog: Option<&str>,
        db_schema: Option<&str>,
        table_name: Option<&str>,
        approximate: bool,
    ) -> Result<BatchReader> {
        self.ensure_ready()?;
        self.inner
            .get_statistics(catalog, db_schema, table_name, approximate)
    }

    pub fn get_statistic_names(&mut self) -> Result<BatchReader> {
        self.ensure_ready()?;
        self.inner.get_statistic_names()
    }

    /// Release the connection.
    ///
    /// The connection is released even if the driver's release hook fails;
    /// that failure is returned. Releasing twice is `InvalidState`.
    pub fn release(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.state = LifecycleState::Released;
        tracing::debug!(driver = %self.config.name(), "Connection released");
        self.inner.release()
    }
}

impl<C: ConnectionImpl> Drop for Connection<C> {
    fn drop(&mut self) {
        if self.state == LifecycleState::Ready {
            self.state = LifecycleState::Released;
            if let Err(status) = self.inner.release() {
                tracing::warn!(error = %status, "Failed to release connection on drop");
            }
        }
    }
}

impl<C: ConnectionImpl> fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("driver", &self.config.name())
            .field("state", &self.state)
            .field("autocommit", &self.autocommit)
            .finish()
    }
}
