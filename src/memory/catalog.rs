//! JSON-configured catalog served by the in-memory driver.
//!
//! ```json
//! {
//!   "catalogs": [{
//!     "name": "main",
//!     "schemas": [{
//!       "name": "public",
//!       "tables": [{
//!         "name": "users",
//!         "table_type": "TABLE",
//!         "columns": [{"name": "id", "xdbc": {"type_name": "INTEGER", "nullable": 0}}],
//!         "constraints": [{"constraint_type": "PRIMARY KEY", "column_names": ["id"]}]
//!       }]
//!     }]
//!   }]
//! }
//! ```

use crate::catalog::{ColumnRecord, ConstraintRecord, ConstraintUsage, XdbcColumn};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn default_table_type() -> String {
    "TABLE".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCatalog {
    #[serde(default)]
    pub catalogs: Vec<CatalogDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schemas: Vec<SchemaDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default = "default_table_type")]
    pub table_type: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(default)]
    pub ordinal_position: Option<i32>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub xdbc: Option<XdbcColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDef {
    #[serde(default)]
    pub name: Option<String>,
    pub constraint_type: String,
    #[serde(default)]
    pub column_names: Vec<String>,
    #[serde(default)]
    pub usage: Option<Vec<ConstraintUsage>>,
}

impl MemoryCatalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the document is not valid JSON or does
    /// not match the catalog layout.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn find_catalog(&self, name: Option<&str>) -> Option<&CatalogDef> {
        self.catalogs.iter().find(|c| c.name.as_deref() == name)
    }

    /// Distinct table types, sorted.
    pub fn table_types(&self) -> Vec<String> {
        self.catalogs
            .iter()
            .flat_map(|c| &c.schemas)
            .flat_map(|s| &s.tables)
            .map(|t| t.table_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Find a table; `None` for catalog or schema matches any.
    pub fn find_table(
        &self,
        catalog: Option<&str>,
        db_schema: Option<&str>,
        table_name: &str,
    ) -> Option<&TableDef> {
        self.catalogs
            .iter()
            .filter(|c| catalog.is_none() || c.name.as_deref() == catalog)
            .flat_map(|c| &c.schemas)
            .filter(|s| db_schema.is_none() || s.name.as_deref() == db_schema)
            .flat_map(|s| &s.tables)
            .find(|t| t.name == table_name)
    }
}

impl CatalogDef {
    pub fn find_schema(&self, name: Option<&str>) -> Option<&SchemaDef> {
        self.schemas.iter().find(|s| s.name.as_deref() == name)
    }
}

impl SchemaDef {
    pub fn find_table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl From<&ColumnDef> for ColumnRecord {
    fn from(def: &ColumnDef) -> Self {
        ColumnRecord {
            name: def.name.clone(),
            ordinal_position: def.ordinal_position,
            remarks: def.remarks.clone(),
            xdbc: def.xdbc.clone(),
        }
    }
}

impl From<&ConstraintDef> for ConstraintRecord {
    fn from(def: &ConstraintDef) -> Self {
        ConstraintRecord {
            name: def.name.clone(),
            constraint_type: def.constraint_type.clone(),
            column_names: def.column_names.clone(),
            usage: def.usage.clone(),
        }
    }
}

impl ColumnDef {
    pub fn type_name(&self) -> Option<&str> {
        self.xdbc.as_ref().and_then(|x| x.type_name.as_deref())
    }

    /// XDBC nullability: `0` means `NOT NULL`; anything else, or no value,
    /// is nullable.
    pub fn is_nullable(&self) -> bool {
        self.xdbc
            .as_ref()
            .and_then(|x: &XdbcColumn| x.nullable)
            .map_or(true, |n| n != 0)
    }
}
