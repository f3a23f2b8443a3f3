//! ADBC Driver implementation.
//!
//! This module provides the `Driver` type which carries driver metadata and
//! serves as a factory for `Database` instances, plus the `DriverImpl`
//! extension point concrete drivers implement.

use crate::adbc::{Database, DatabaseImpl};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Static driver metadata.
///
/// The error prefix is prepended to every framework-generated error message
/// so callers can tell which driver produced it.
///
/// # Example
///
/// ```
/// use adbc_driver_kit::adbc::DriverConfig;
///
/// let config = DriverConfig::builder("sqlite")
///     .version("1.2.0")
///     .vendor("SQLite")
///     .build();
/// assert_eq!(config.error_prefix(), "[sqlite]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    name: String,
    version: String,
    vendor: String,
    error_prefix: String,
}

impl DriverConfig {
    /// Start building a configuration for the named driver.
    pub fn builder(name: impl Into<String>) -> DriverConfigBuilder {
        DriverConfigBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Prefix for framework error messages, `[name]` unless overridden.
    pub fn error_prefix(&self) -> &str {
        &self.error_prefix
    }
}

/// Builder for [`DriverConfig`].
#[derive(Debug, Clone)]
pub struct DriverConfigBuilder {
    name: String,
    version: Option<String>,
    vendor: Option<String>,
    error_prefix: Option<String>,
}

impl DriverConfigBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            vendor: None,
            error_prefix: None,
        }
    }

    /// Set the driver version. Defaults to this crate's version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the vendor name. Defaults to the driver name.
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn error_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.error_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> DriverConfig {
        let error_prefix = self
            .error_prefix
            .unwrap_or_else(|| format!("[{}]", self.name));
        DriverConfig {
            version: self
                .version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            vendor: self.vendor.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            error_prefix,
        }
    }
}

/// Extension point for a concrete driver.
pub trait DriverImpl: Default {
    type Database: DatabaseImpl;

    /// Metadata for this driver. Called once per [`Driver`].
    fn config(&self) -> DriverConfig;

    /// Create an uninitialized database implementation.
    fn new_database(&self) -> Result<Self::Database>;
}

/// ADBC driver: metadata plus a database factory.
///
/// # Example
///
/// ```
/// use adbc_driver_kit::adbc::Driver;
/// use adbc_driver_kit::memory::MemoryDriver;
///
/// let driver: Driver<MemoryDriver> = Driver::new();
/// println!("Driver: {} v{}", driver.name(), driver.version());
/// ```
pub struct Driver<D: DriverImpl> {
    inner: D,
    config: Arc<DriverConfig>,
}

impl<D: DriverImpl> Driver<D> {
    /// Create a driver from the implementation's `Default`.
    pub fn new() -> Self {
        Self::with_impl(D::default())
    }

    pub fn with_impl(inner: D) -> Self {
        let config = Arc::new(inner.config());
        Self { inner, config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn version(&self) -> &str {
        self.config.version()
    }

    pub fn vendor(&self) -> &str {
        self.config.vendor()
    }

    /// Create a new, uninitialized database.
    ///
    /// # Errors
    ///
    /// Returns the driver's `new_database` error verbatim.
    pub fn new_database(&self) -> Result<Database<D::Database>> {
        let inner = self.inner.new_database()?;
        tracing::debug!(driver = %self.config.name(), "Created database");
        Ok(Database::new(inner, Arc::clone(&self.config)))
    }
}

impl<D: DriverImpl> Default for Driver<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DriverImpl> fmt::Display for Driver<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} ({})",
            self.config.name(),
            self.config.version(),
            self.config.vendor()
        )
    }
}

impl<D: DriverImpl> fmt::Debug for Driver<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("config", &self.config)
            .finish()
    }
}
