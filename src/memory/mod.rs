//! In-memory reference driver.
//!
//! Serves catalog metadata from a JSON document supplied as a database
//! option and implements every connection extension point, so it doubles as
//! the driver exported over the C ABI and as a test fixture.
//!
//! | Database option | Meaning |
//! |---|---|
//! | `adbc.memory.catalog` | JSON catalog document (see [`catalog`]) |
//! | `adbc.memory.default_catalog` | reported as the connection's current catalog |
//! | `adbc.memory.default_schema` | reported as the connection's current schema |

pub mod catalog;
pub mod cursor;
pub mod pattern;
pub mod types;

pub use catalog::MemoryCatalog;
pub use cursor::MemoryCursor;

use crate::adbc::{ConnectionImpl, DatabaseImpl, DriverConfig, DriverImpl};
use crate::arrow_conversion::info::{InfoValue, INFO_DRIVER_ARROW_VERSION, INFO_VENDOR_VERSION};
use crate::catalog::CatalogCursor;
use crate::error::{Result, Status};
use crate::options::OptionValue;
use arrow_schema::{Field, Schema};
use std::sync::Arc;

pub const MEMORY_CATALOG: &str = "adbc.memory.catalog";
pub const MEMORY_DEFAULT_CATALOG: &str = "adbc.memory.default_catalog";
pub const MEMORY_DEFAULT_SCHEMA: &str = "adbc.memory.default_schema";

const ARROW_VERSION: &str = "56";

#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryDriver;

impl DriverImpl for MemoryDriver {
    type Database = MemoryDatabase;

    fn config(&self) -> DriverConfig {
        DriverConfig::builder("memory")
            .vendor("adbc-driver-kit")
            .build()
    }

    fn new_database(&self) -> Result<MemoryDatabase> {
        Ok(MemoryDatabase::default())
    }
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    catalog: Arc<MemoryCatalog>,
    default_catalog: Option<String>,
    default_schema: Option<String>,
}

impl MemoryDatabase {
    pub fn catalog(&self) -> &MemoryCatalog {
        &self.catalog
    }
}

impl DatabaseImpl for MemoryDatabase {
    type Connection = MemoryConnection;

    fn set_option(&mut self, key: &str, value: &OptionValue) -> Result<bool> {
        match key {
            MEMORY_CATALOG => {
                self.catalog = Arc::new(MemoryCatalog::from_json(value.as_str()?)?);
            }
            MEMORY_DEFAULT_CATALOG => self.default_catalog = Some(value.as_str()?.to_string()),
            MEMORY_DEFAULT_SCHEMA => self.default_schema = Some(value.as_str()?.to_string()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn get_option(&self, key: &str) -> Result<Option<OptionValue>> {
        Ok(match key {
            MEMORY_CATALOG => Some(OptionValue::String(self.catalog.to_json()?)),
            MEMORY_DEFAULT_CATALOG => Some(self.default_catalog.clone().into()),
            MEMORY_DEFAULT_SCHEMA => Some(self.default_schema.clone().into()),
            _ => None,
        })
    }

    fn new_connection(&self) -> Result<MemoryConnection> {
        Ok(MemoryConnection::default())
    }
}

/// Connection to a [`MemoryDatabase`].
///
/// Transactions have no effect on the data; the connection only counts
/// commits, rollbacks and autocommit toggles.
#[derive(Debug, Default)]
pub struct MemoryConnection {
    catalog: Arc<MemoryCatalog>,
    current_catalog: Option<String>,
    current_schema: Option<String>,
    commits: usize,
    rollbacks: usize,
    autocommit_toggles: usize,
    released: bool,
}

impl MemoryConnection {
    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks
    }

    pub fn autocommit_toggles(&self) -> usize {
        self.autocommit_toggles
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl ConnectionImpl for MemoryConnection {
    type Database = MemoryDatabase;

    fn init(&mut self, database: &MemoryDatabase) -> Result<()> {
        self.catalog = Arc::clone(&database.catalog);
        self.current_catalog = database.default_catalog.clone();
        self.current_schema = database.default_schema.clone();
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    fn toggle_autocommit(&mut self, enabled: bool) -> Result<()> {
        tracing::trace!(enabled, "Toggling autocommit");
        self.autocommit_toggles += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.rollbacks += 1;
        Ok(())
    }

    fn current_catalog(&self) -> Result<Option<String>> {
        Ok(self.current_catalog.clone())
    }

    fn current_schema(&self) -> Result<Option<String>> {
        Ok(self.current_schema.clone())
    }

    fn catalog_cursor(&mut self) -> Result<Box<dyn CatalogCursor + '_>> {
        Ok(Box::new(MemoryCursor::new(&self.catalog)))
    }

    fn get_table_schema(
        &mut self,
        catalog: Option<&str>,
        db_schema: Option<&str>,
        table_name: &str,
    ) -> Result<Schema> {
        let table = self
            .catalog
            .find_table(catalog, db_schema, table_name)
            .ok_or_else(|| Status::not_found(format!("Table not found: {}", table_name)))?;

        let fields = table
            .columns
            .iter()
            .map(|column| {
                let data_type = match column.type_name() {
                    Some(type_name) => types::sql_to_arrow(type_name)?,
                    None => arrow_schema::DataType::Null,
                };
                Ok(Field::new(&column.name, data_type, column.is_nullable()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema::new(fields))
    }

    fn get_table_types(&mut self) -> Result<Vec<String>> {
        Ok(self.catalog.table_types())
    }

    fn info(&self, _codes: &[u32]) -> Result<Vec<(u32, InfoValue)>> {
        Ok(vec![
            (INFO_VENDOR_VERSION, InfoValue::from(env!("CARGO_PKG_VERSION"))),
            (INFO_DRIVER_ARROW_VERSION, InfoValue::from(ARROW_VERSION)),
        ])
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adbc::Driver;
    use crate::error::StatusKind;
    use crate::options::{CONNECTION_CURRENT_CATALOG, CONNECTION_CURRENT_DB_SCHEMA};
    use arrow_schema::DataType;

    const CATALOG: &str = r#"{"catalogs": [{"name": "main", "schemas": [{"name": "public",
        "tables": [{"name": "users", "columns": [
            {"name": "id", "xdbc": {"type_name": "BIGINT", "nullable": 0}},
            {"name": "email", "xdbc": {"type_name": "VARCHAR(255)"}},
            {"name": "note"}
        ]}]}]}]}"#;

    fn database() -> crate::adbc::Database<MemoryDatabase> {
        let mut database = Driver::<MemoryDriver>::new().new_database().unwrap();
        database.set_option(MEMORY_CATALOG, CATALOG).unwrap();
        database.set_option(MEMORY_DEFAULT_CATALOG, "main").unwrap();
        database.set_option(MEMORY_DEFAULT_SCHEMA, "public").unwrap();
        database.init().unwrap();
        database
    }

    #[test]
    fn test_invalid_catalog_option() {
        let mut database = Driver::<MemoryDriver>::new().new_database().unwrap();
        let err = database.set_option(MEMORY_CATALOG, "not json").unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidArgument);
        let err = database.set_option(MEMORY_DEFAULT_SCHEMA, 5i64).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidArgument);
    }

    #[test]
    fn test_database_options_roundtrip() {
        let database = database();
        assert_eq!(
            database.get_option(MEMORY_DEFAULT_CATALOG).unwrap(),
            OptionValue::from("main")
        );
        let json = database.get_option(MEMORY_CATALOG).unwrap();
        let parsed = MemoryCatalog::from_json(json.as_str().unwrap()).unwrap();
        assert_eq!(&parsed, database.inner().catalog());
    }

    #[test]
    fn test_current_catalog_and_schema() {
        let database = database();
        let connection = database.connect().unwrap();
        assert_eq!(
            connection.get_option(CONNECTION_CURRENT_CATALOG).unwrap(),
            OptionValue::from("main")
        );
        assert_eq!(
            connection.get_option(CONNECTION_CURRENT_DB_SCHEMA).unwrap(),
            OptionValue::from("public")
        );
    }

    #[test]
    fn test_table_schema() {
        let database = database();
        let mut connection = database.connect().unwrap();
        let schema = connection
            .get_table_schema(Some("main"), None, "users")
            .unwrap();
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert!(!schema.field(0).is_nullable());
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert!(schema.field(1).is_nullable());
        assert_eq!(schema.field(2).data_type(), &DataType::Null);

        let err = connection
            .get_table_schema(None, None, "missing")
            .unwrap_err();
        assert_eq!(err.kind(), StatusKind::NotFound);
    }

    #[test]
    fn test_release_hook_runs() {
        let database = database();
        let mut connection = database.connect().unwrap();
        connection.release().unwrap();
        assert!(connection.inner().is_released());
    }
}
