//! Option values exchanged between callers and drivers.
//!
//! Options are addressed by string key and carry an [`OptionValue`]. Typed
//! accessors never coerce silently: the only accepted conversions are the
//! ADBC enabled/disabled literals for booleans and decimal strings for
//! integers.

use crate::error::{Result, Status};
use std::fmt;

/// Connection option controlling autocommit.
pub const CONNECTION_AUTOCOMMIT: &str = "adbc.connection.autocommit";
/// Read-only connection option reporting the current catalog.
pub const CONNECTION_CURRENT_CATALOG: &str = "adbc.connection.catalog";
/// Read-only connection option reporting the current database schema.
pub const CONNECTION_CURRENT_DB_SCHEMA: &str = "adbc.connection.db_schema";

/// Canonical "enabled" option literal.
pub const VALUE_ENABLED: &str = "true";
/// Canonical "disabled" option literal.
pub const VALUE_DISABLED: &str = "false";

/// A typed option value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionValue {
    /// No value
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl OptionValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, OptionValue::Absent)
    }

    /// Interpret the value as a boolean.
    ///
    /// Accepts `Bool` and the strings `"true"` / `"false"`.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            OptionValue::Bool(b) => Ok(*b),
            OptionValue::String(s) if s == VALUE_ENABLED => Ok(true),
            OptionValue::String(s) if s == VALUE_DISABLED => Ok(false),
            _ => Err(self.type_mismatch("boolean")),
        }
    }

    /// Interpret the value as a 64-bit integer.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            OptionValue::Int(i) => Ok(*i),
            OptionValue::String(s) => s.trim().parse().map_err(|_| self.type_mismatch("integer")),
            _ => Err(self.type_mismatch("integer")),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match self {
            OptionValue::Double(d) => Ok(*d),
            _ => Err(self.type_mismatch("double")),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            OptionValue::String(s) => Ok(s),
            _ => Err(self.type_mismatch("string")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            OptionValue::Bytes(b) => Ok(b),
            _ => Err(self.type_mismatch("bytes")),
        }
    }

    fn type_mismatch(&self, expected: &str) -> Status {
        Status::invalid_argument(format!("Invalid {} value {}", expected, self))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Absent => write!(f, "(NULL)"),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Double(d) => write!(f, "{}", d),
            OptionValue::String(s) => write!(f, "'{}'", s),
            OptionValue::Bytes(b) => write!(f, "({} bytes)", b.len()),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Double(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<Vec<u8>> for OptionValue {
    fn from(value: Vec<u8>) -> Self {
        OptionValue::Bytes(value)
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(OptionValue::Absent, Into::into)
    }
}

impl From<adbc_core::options::OptionValue> for OptionValue {
    #[allow(unreachable_patterns)]
    fn from(value: adbc_core::options::OptionValue) -> Self {
        use adbc_core::options::OptionValue as AdbcValue;
        match value {
            AdbcValue::String(s) => OptionValue::String(s),
            AdbcValue::Bytes(b) => OptionValue::Bytes(b),
            AdbcValue::Int(i) => OptionValue::Int(i),
            AdbcValue::Double(d) => OptionValue::Double(d),
            _ => OptionValue::Absent,
        }
    }
}
