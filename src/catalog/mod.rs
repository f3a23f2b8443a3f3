//! Catalog introspection: depth, filters, records, cursor and builder.
//!
//! `GetObjects` walks a driver-supplied [`CatalogCursor`] level by level
//! (catalogs → schemas → tables → columns/constraints) down to the requested
//! [`ObjectDepth`] and assembles the result into an in-memory tree, which
//! [`crate::arrow_conversion`] then serializes into the fixed nested Arrow
//! structure.

pub mod builder;
pub mod cursor;

pub use builder::{CatalogBuilder, CatalogEntry, SchemaEntry, TableEntry};
pub use cursor::{CatalogCursor, CursorGuard};

use crate::error::{Result, Status};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ADBC depth code: all levels (same as columns).
pub const OBJECT_DEPTH_ALL: i32 = 0;
/// ADBC depth code: catalogs only.
pub const OBJECT_DEPTH_CATALOGS: i32 = 1;
/// ADBC depth code: catalogs and schemas.
pub const OBJECT_DEPTH_DB_SCHEMAS: i32 = 2;
/// ADBC depth code: catalogs, schemas and tables.
pub const OBJECT_DEPTH_TABLES: i32 = 3;
/// ADBC depth code: everything down to columns.
pub const OBJECT_DEPTH_COLUMNS: i32 = OBJECT_DEPTH_ALL;

/// How deep `GetObjects` descends, coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectDepth {
    Catalogs,
    Schemas,
    Tables,
    Columns,
}

impl ObjectDepth {
    /// Parse an ADBC depth code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            OBJECT_DEPTH_ALL => Some(ObjectDepth::Columns),
            OBJECT_DEPTH_CATALOGS => Some(ObjectDepth::Catalogs),
            OBJECT_DEPTH_DB_SCHEMAS => Some(ObjectDepth::Schemas),
            OBJECT_DEPTH_TABLES => Some(ObjectDepth::Tables),
            _ => None,
        }
    }

    /// The ADBC depth code for this depth.
    pub fn code(self) -> i32 {
        match self {
            ObjectDepth::Catalogs => OBJECT_DEPTH_CATALOGS,
            ObjectDepth::Schemas => OBJECT_DEPTH_DB_SCHEMAS,
            ObjectDepth::Tables => OBJECT_DEPTH_TABLES,
            ObjectDepth::Columns => OBJECT_DEPTH_COLUMNS,
        }
    }

    /// Whether traversal at this depth descends into `level`.
    pub fn includes(self, level: ObjectDepth) -> bool {
        level <= self
    }
}

impl From<adbc_core::options::ObjectDepth> for ObjectDepth {
    #[allow(unreachable_patterns)]
    fn from(depth: adbc_core::options::ObjectDepth) -> Self {
        use adbc_core::options::ObjectDepth as AdbcDepth;
        match depth {
            AdbcDepth::Catalogs => ObjectDepth::Catalogs,
            AdbcDepth::Schemas => ObjectDepth::Schemas,
            AdbcDepth::Tables => ObjectDepth::Tables,
            AdbcDepth::All | AdbcDepth::Columns => ObjectDepth::Columns,
            _ => ObjectDepth::Columns,
        }
    }
}

impl fmt::Display for ObjectDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectDepth::Catalogs => write!(f, "catalogs"),
            ObjectDepth::Schemas => write!(f, "db_schemas"),
            ObjectDepth::Tables => write!(f, "tables"),
            ObjectDepth::Columns => write!(f, "columns"),
        }
    }
}

/// Caller-supplied filters for `GetObjects`.
///
/// `None` means unfiltered. Pattern semantics belong to the driver; the
/// builder passes filters through to the cursor untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub catalog: Option<String>,
    pub db_schema: Option<String>,
    pub table_name: Option<String>,
    pub column_name: Option<String>,
    pub table_types: Option<Vec<String>>,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(mut self, pattern: impl Into<String>) -> Self {
        self.catalog = Some(pattern.into());
        self
    }

    pub fn db_schema(mut self, pattern: impl Into<String>) -> Self {
        self.db_schema = Some(pattern.into());
        self
    }

    pub fn table_name(mut self, pattern: impl Into<String>) -> Self {
        self.table_name = Some(pattern.into());
        self
    }

    pub fn column_name(mut self, pattern: impl Into<String>) -> Self {
        self.column_name = Some(pattern.into());
        self
    }

    pub fn table_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table_types = Some(types.into_iter().map(Into::into).collect());
        self
    }
}

/// A catalog yielded by a cursor. `name` is `None` when the database has no
/// catalog concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub name: Option<String>,
}

impl CatalogRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn unnamed() -> Self {
        Self { name: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRecord {
    pub name: Option<String>,
}

impl SchemaRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn unnamed() -> Self {
        Self { name: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    pub name: String,
    pub table_type: String,
}

impl TableRecord {
    pub fn new(name: impl Into<String>, table_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_type: table_type.into(),
        }
    }
}

/// XDBC (JDBC/ODBC-compatible) column metadata. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XdbcColumn {
    pub data_type: Option<i16>,
    pub type_name: Option<String>,
    pub column_size: Option<i32>,
    pub decimal_digits: Option<i16>,
    pub num_prec_radix: Option<i16>,
    pub nullable: Option<i16>,
    pub column_def: Option<String>,
    pub sql_data_type: Option<i16>,
    pub datetime_sub: Option<i16>,
    pub char_octet_length: Option<i32>,
    pub is_nullable: Option<String>,
    pub scope_catalog: Option<String>,
    pub scope_schema: Option<String>,
    pub scope_table: Option<String>,
    pub is_autoincrement: Option<bool>,
    pub is_generatedcolumn: Option<bool>,
}

/// A column yielded by a cursor.
///
/// Leave `ordinal_position` unset to have the builder number columns in
/// emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    pub name: String,
    pub ordinal_position: Option<i32>,
    pub remarks: Option<String>,
    pub xdbc: Option<XdbcColumn>,
}

impl ColumnRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal_position: None,
            remarks: None,
            xdbc: None,
        }
    }

    pub fn with_ordinal(mut self, ordinal_position: i32) -> Self {
        self.ordinal_position = Some(ordinal_position);
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn with_xdbc(mut self, xdbc: XdbcColumn) -> Self {
        self.xdbc = Some(xdbc);
        self
    }
}

/// Foreign-key target of a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintUsage {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub db_schema: Option<String>,
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintRecord {
    pub name: Option<String>,
    pub constraint_type: String,
    pub column_names: Vec<String>,
    pub usage: Option<Vec<ConstraintUsage>>,
}

impl ConstraintRecord {
    pub fn new<I, S>(constraint_type: impl Into<String>, column_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            constraint_type: constraint_type.into(),
            column_names: column_names.into_iter().map(Into::into).collect(),
            usage: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_usage(mut self, usage: Vec<ConstraintUsage>) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Parse a raw depth code, rejecting anything outside the four ADBC levels.
pub(crate) fn parse_depth(code: i32, error_prefix: &str) -> Result<ObjectDepth> {
    ObjectDepth::from_code(code).ok_or_else(|| {
        Status::invalid_argument(format!(
            "{} GetObjects: invalid depth {}",
            error_prefix, code
        ))
    })
}
