//! ADBC Database implementation.
//!
//! This module provides the `Database` type which holds database-level
//! options and acts as the factory (and init-time parent) for connections.

use crate::adbc::{Connection, ConnectionImpl, DriverConfig, LifecycleState};
use crate::error::{Result, Status};
use crate::options::OptionValue;
use std::fmt;
use std::sync::Arc;

/// Extension point for a concrete database.
pub trait DatabaseImpl: Sized {
    type Connection: ConnectionImpl<Database = Self>;

    /// Handle a database option. Return `Ok(false)` for unknown keys.
    fn set_option(&mut self, _key: &str, _value: &OptionValue) -> Result<bool> {
        Ok(false)
    }

    /// Read a database option. Return `Ok(None)` for unknown keys.
    fn get_option(&self, _key: &str) -> Result<Option<OptionValue>> {
        Ok(None)
    }

    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Create an uninitialized connection implementation.
    fn new_connection(&self) -> Result<Self::Connection>;

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// ADBC database: option holder and connection factory.
///
/// Follows the same lifecycle as connections: options may be set while
/// uninitialized or ready, everything else requires ready, and a released
/// database rejects every operation.
pub struct Database<D: DatabaseImpl> {
    inner: D,
    state: LifecycleState,
    config: Arc<DriverConfig>,
}

impl<D: DatabaseImpl> Database<D> {
    pub fn new(inner: D, config: Arc<DriverConfig>) -> Self {
        Self {
            inner,
            state: LifecycleState::Uninitialized,
            config,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The driver implementation, for connections initializing against it.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn prefix(&self) -> &str {
        self.config.error_prefix()
    }

    fn ensure_not_released(&self) -> Result<()> {
        if self.state == LifecycleState::Released {
            return Err(Status::invalid_state(format!(
                "{} Database is released",
                self.prefix()
            )));
        }
        Ok(())
    }

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        match self.state {
            LifecycleState::Ready => Ok(()),
            LifecycleState::Uninitialized => Err(Status::invalid_state(format!(
                "{} Database is not initialized",
                self.prefix()
            ))),
            LifecycleState::Released => Err(Status::invalid_state(format!(
                "{} Database is released",
                self.prefix()
            ))),
        }
    }

    /// Set a database option.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` once released, `NotImplemented` for keys the
    /// driver does not recognize, or the driver's error verbatim.
    pub fn set_option(&mut self, key: &str, value: impl Into<OptionValue>) -> Result<()> {
        self.ensure_not_released()?;
        let value = value.into();
        if self.inner.set_option(key, &value)? {
            tracing::debug!(key, %value, "Set database option");
            Ok(())
        } else {
            Err(Status::not_implemented(format!(
                "{} Unknown database option {}={}",
                self.prefix(),
                key,
                value
            )))
        }
    }

    /// Read a database option; `NotFound` for unknown keys.
    pub fn get_option(&self, key: &str) -> Result<OptionValue> {
        self.ensure_not_released()?;
        self.inner.get_option(key)?.ok_or_else(|| {
            Status::not_found(format!("{} Unknown database option {}", self.prefix(), key))
        })
    }

    /// Initialize the database. Only valid once, before release.
    pub fn init(&mut self) -> Result<()> {
        match self.state {
            LifecycleState::Uninitialized => {}
            LifecycleState::Ready => {
                return Err(Status::invalid_state(format!(
                    "{} Database already initialized",
                    self.prefix()
                )))
            }
            LifecycleState::Released => self.ensure_not_released()?,
        }
        self.inner.init()?;
        self.state = LifecycleState::Ready;
        tracing::debug!(driver = %self.config.name(), "Database initialized");
        Ok(())
    }

    /// Create an uninitialized connection so options can be set before
    /// [`Connection::init`].
    pub fn new_connection(&self) -> Result<Connection<D::Connection>> {
        self.ensure_not_released()?;
        let inner = self.inner.new_connection()?;
        Ok(Connection::new(inner, Arc::clone(&self.config)))
    }

    /// Create a connection and initialize it against this database.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the database is ready, or the driver's
    /// connection creation or init error verbatim.
    pub fn connect(&self) -> Result<Connection<D::Connection>> {
        self.ensure_ready()?;
        let mut connection = self.new_connection()?;
        connection.init(self)?;
        Ok(connection)
    }

    /// Release the database. A failing release hook still leaves the
    /// database released.
    pub fn release(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.state = LifecycleState::Released;
        tracing::debug!(driver = %self.config.name(), "Database released");
        self.inner.release()
    }
}

impl<D: DatabaseImpl> Drop for Database<D> {
    fn drop(&mut self) {
        if self.state == LifecycleState::Ready {
            self.state = LifecycleState::Released;
            if let Err(status) = self.inner.release() {
                tracing::warn!(error = %status, "Failed to release database on drop");
            }
        }
    }
}

impl<D: DatabaseImpl> fmt::Debug for Database<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("driver", &self.config.name())
            .field("state", &self.state)
            .finish()
    }
}

impl<D: DatabaseImpl> fmt::Display for Database<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Database({}, {})", self.config.name(), self.state)
    }
}
