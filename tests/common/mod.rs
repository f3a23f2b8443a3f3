//! Common test utilities for adbc-driver-kit integration tests.
//!
//! Provides a scripted driver whose connection counts every hook invocation
//! and whose catalog cursor records every call it receives, with failures
//! injectable at any cursor method or hook.
//!
//! # Call log format
//!
//! | Call | Logged as |
//! |------|-----------|
//! | `prefetch` | `prefetch(<depth>)` |
//! | `load_catalogs` | `load_catalogs(<filter>)` |
//! | `load_schemas` | `load_schemas(<catalog>, <filter>)` |
//! | `load_tables` | `load_tables(<catalog>, <schema>, <filter>, <types>)` |
//! | `load_columns` | `load_columns(<catalog>, <schema>, <table>, <filter>)` |
//! | `next_*` / `close` | method name |
//!
//! Absent values are logged as `*`; table types are joined with `|`.

#![allow(dead_code)]

use adbc_driver_kit::adbc::{
    Connection, ConnectionImpl, Database, DatabaseImpl, Driver, DriverConfig, DriverImpl,
};
use adbc_driver_kit::catalog::{
    CatalogCursor, CatalogFilter, CatalogRecord, ColumnRecord, ConstraintRecord, ObjectDepth,
    SchemaRecord, TableRecord,
};
use adbc_driver_kit::error::{Result, Status};
use adbc_driver_kit::StreamSlot;
use arrow::array::RecordBatch;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

// ============================================================================
// Scripted Catalog Tree
// ============================================================================

#[derive(Debug, Clone)]
pub struct CatalogNode {
    pub name: Option<String>,
    pub schemas: Vec<SchemaNode>,
}

#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub name: Option<String>,
    pub tables: Vec<TableNode>,
}

#[derive(Debug, Clone)]
pub struct TableNode {
    pub name: String,
    pub table_type: String,
    pub columns: Vec<ColumnRecord>,
    pub constraints: Vec<ConstraintRecord>,
}

pub fn catalog(name: &str, schemas: Vec<SchemaNode>) -> CatalogNode {
    CatalogNode {
        name: Some(name.to_string()),
        schemas,
    }
}

pub fn schema(name: &str, tables: Vec<TableNode>) -> SchemaNode {
    SchemaNode {
        name: Some(name.to_string()),
        tables,
    }
}

pub fn table(name: &str, columns: Vec<ColumnRecord>) -> TableNode {
    TableNode {
        name: name.to_string(),
        table_type: "TABLE".to_string(),
        columns,
        constraints: Vec::new(),
    }
}

/// One catalog, schema and table: `c1 -> s1 -> t1(id, name)`.
pub fn simple_tree() -> Vec<CatalogNode> {
    vec![catalog(
        "c1",
        vec![schema(
            "s1",
            vec![table(
                "t1",
                vec![
                    ColumnRecord::new("id").with_ordinal(1),
                    ColumnRecord::new("name").with_ordinal(2),
                ],
            )],
        )],
    )]
}

// ============================================================================
// Recording Cursor
// ============================================================================

/// Shared, ordered log of cursor calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: String) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Calls whose method name starts with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.0.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

fn arg(value: Option<&str>) -> &str {
    value.unwrap_or("*")
}

/// Cursor over a [`CatalogNode`] tree that applies no filtering and records
/// every call.
pub struct RecordingCursor {
    tree: Vec<CatalogNode>,
    log: CallLog,
    closes: Rc<Cell<usize>>,
    fail_on: Option<(&'static str, Status)>,
    fail_close: Option<Status>,
    catalogs: VecDeque<CatalogRecord>,
    schemas: VecDeque<SchemaRecord>,
    tables: VecDeque<TableRecord>,
    columns: VecDeque<ColumnRecord>,
    constraints: VecDeque<ConstraintRecord>,
}

impl RecordingCursor {
    pub fn new(tree: Vec<CatalogNode>) -> Self {
        Self {
            tree,
            log: CallLog::default(),
            closes: Rc::new(Cell::new(0)),
            fail_on: None,
            fail_close: None,
            catalogs: VecDeque::new(),
            schemas: VecDeque::new(),
            tables: VecDeque::new(),
            columns: VecDeque::new(),
            constraints: VecDeque::new(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn close_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.closes)
    }

    /// Fail the first call to `method` with `status`.
    pub fn fail_on(mut self, method: &'static str, status: Status) -> Self {
        self.fail_on = Some((method, status));
        self
    }

    pub fn fail_close(mut self, status: Status) -> Self {
        self.fail_close = Some(status);
        self
    }

    fn record(&mut self, method: &'static str, call: String) -> Result<()> {
        self.log.push(call);
        let armed = matches!(&self.fail_on, Some((target, _)) if *target == method);
        if armed {
            if let Some((_, status)) = self.fail_on.take() {
                return Err(status);
            }
        }
        Ok(())
    }

    fn find_catalog(&self, name: Option<&str>) -> Option<&CatalogNode> {
        self.tree.iter().find(|c| c.name.as_deref() == name)
    }

    fn find_schema(&self, catalog: Option<&str>, name: Option<&str>) -> Option<&SchemaNode> {
        self.find_catalog(catalog)?
            .schemas
            .iter()
            .find(|s| s.name.as_deref() == name)
    }

    fn find_table(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        name: &str,
    ) -> Option<&TableNode> {
        self.find_schema(catalog, schema)?
            .tables
            .iter()
            .find(|t| t.name == name)
    }
}

impl CatalogCursor for RecordingCursor {
    fn prefetch(&mut self, depth: ObjectDepth, _filter: &CatalogFilter) -> Result<()> {
        self.record("prefetch", format!("prefetch({})", depth))
    }

    fn load_catalogs(&mut self, catalog_filter: Option<&str>) -> Result<()> {
        self.record(
            "load_catalogs",
            format!("load_catalogs({})", arg(catalog_filter)),
        )?;
        self.catalogs = self
            .tree
            .iter()
            .map(|c| CatalogRecord { name: c.name.clone() })
            .collect();
        Ok(())
    }

    fn next_catalog(&mut self) -> Result<Option<CatalogRecord>> {
        self.record("next_catalog", "next_catalog".to_string())?;
        Ok(self.catalogs.pop_front())
    }

    fn load_schemas(&mut self, catalog: Option<&str>, schema_filter: Option<&str>) -> Result<()> {
        self.record(
            "load_schemas",
            format!("load_schemas({}, {})", arg(catalog), arg(schema_filter)),
        )?;
        self.schemas = self
            .find_catalog(catalog)
            .map(|c| {
                c.schemas
                    .iter()
                    .map(|s| SchemaRecord { name: s.name.clone() })
                    .collect()
            })
            .unwrap_or_default();
        Ok(())
    }

    fn next_schema(&mut self) -> Result<Option<SchemaRecord>> {
        self.record("next_schema", "next_schema".to_string())?;
        Ok(self.schemas.pop_front())
    }

    fn load_tables(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table_filter: Option<&str>,
        table_types: Option<&[String]>,
    ) -> Result<()> {
        let types = table_types.map(|t| t.join("|"));
        self.record(
            "load_tables",
            format!(
                "load_tables({}, {}, {}, {})",
                arg(catalog),
                arg(schema),
                arg(table_filter),
                arg(types.as_deref())
            ),
        )?;
        self.tables = self
            .find_schema(catalog, schema)
            .map(|s| {
                s.tables
                    .iter()
                    .map(|t| TableRecord::new(t.name.as_str(), t.table_type.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(())
    }

    fn next_table(&mut self) -> Result<Option<TableRecord>> {
        self.record("next_table", "next_table".to_string())?;
        Ok(self.tables.pop_front())
    }

    fn load_columns(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
        column_filter: Option<&str>,
    ) -> Result<()> {
        self.record(
            "load_columns",
            format!(
                "load_columns({}, {}, {}, {})",
                arg(catalog),
                arg(schema),
                table,
                arg(column_filter)
            ),
        )?;
        let (columns, constraints) = self
            .find_table(catalog, schema, table)
            .map(|t| (t.columns.clone(), t.constraints.clone()))
            .unwrap_or_default();
        self.columns = columns.into();
        self.constraints = constraints.into();
        Ok(())
    }

    fn next_column(&mut self) -> Result<Option<ColumnRecord>> {
        self.record("next_column", "next_column".to_string())?;
        Ok(self.columns.pop_front())
    }

    fn next_constraint(&mut self) -> Result<Option<ConstraintRecord>> {
        self.record("next_constraint", "next_constraint".to_string())?;
        Ok(self.constraints.pop_front())
    }

    fn close(&mut self) -> Result<()> {
        self.log.push("close".to_string());
        self.closes.set(self.closes.get() + 1);
        match self.fail_close.take() {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Scripted Driver
// ============================================================================

#[derive(Debug, Default)]
pub struct ScriptedDriver;

impl DriverImpl for ScriptedDriver {
    type Database = ScriptedDatabase;

    fn config(&self) -> DriverConfig {
        DriverConfig::builder("scripted").version("9.9.9").build()
    }

    fn new_database(&self) -> Result<ScriptedDatabase> {
        Ok(ScriptedDatabase::default())
    }
}

#[derive(Debug, Default)]
pub struct ScriptedDatabase {
    pub options: Vec<(String, String)>,
}

impl DatabaseImpl for ScriptedDatabase {
    type Connection = ScriptedConnection;

    fn set_option(
        &mut self,
        key: &str,
        value: &adbc_driver_kit::OptionValue,
    ) -> Result<bool> {
        if !key.starts_with("scripted.") {
            return Ok(false);
        }
        self.options.push((key.to_string(), value.to_string()));
        Ok(true)
    }

    fn new_connection(&self) -> Result<ScriptedConnection> {
        Ok(ScriptedConnection::default())
    }
}

/// Connection whose hooks count their invocations and can be made to fail.
///
/// Cursor failures are armed on the connection and handed to the cursor
/// created by the next `GetObjects` call.
#[derive(Default)]
pub struct ScriptedConnection {
    pub tree: Vec<CatalogNode>,
    pub log: CallLog,
    pub closes: Rc<Cell<usize>>,
    pub cursor_failure: Option<(&'static str, Status)>,
    pub close_failure: Option<Status>,
    pub init_failure: Option<Status>,
    pub commit_failure: Option<Status>,
    pub toggle_failure: Option<Status>,
    pub release_failure: Option<Status>,
    pub inits: usize,
    pub toggles: Vec<bool>,
    pub commits: usize,
    pub rollbacks: usize,
    pub releases: Rc<Cell<usize>>,
}

impl ConnectionImpl for ScriptedConnection {
    type Database = ScriptedDatabase;

    fn init(&mut self, _database: &ScriptedDatabase) -> Result<()> {
        if let Some(status) = self.init_failure.take() {
            return Err(status);
        }
        self.inits += 1;
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    fn toggle_autocommit(&mut self, enabled: bool) -> Result<()> {
        if let Some(status) = self.toggle_failure.take() {
            return Err(status);
        }
        self.toggles.push(enabled);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if let Some(status) = self.commit_failure.take() {
            return Err(status);
        }
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.rollbacks += 1;
        Ok(())
    }

    fn catalog_cursor(&mut self) -> Result<Box<dyn CatalogCursor + '_>> {
        let mut cursor = RecordingCursor::new(self.tree.clone());
        cursor.log = self.log.clone();
        cursor.closes = Rc::clone(&self.closes);
        cursor.fail_on = self.cursor_failure.take();
        cursor.fail_close = self.close_failure.take();
        Ok(Box::new(cursor))
    }

    fn release(&mut self) -> Result<()> {
        self.releases.set(self.releases.get() + 1);
        match self.release_failure.take() {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn scripted_database() -> Database<ScriptedDatabase> {
    let mut database = Driver::<ScriptedDriver>::new()
        .new_database()
        .expect("database");
    database.init().expect("database init");
    database
}

/// A ready connection serving `tree`.
pub fn scripted_connection(
    database: &Database<ScriptedDatabase>,
    tree: Vec<CatalogNode>,
) -> Connection<ScriptedConnection> {
    let mut connection = database.new_connection().expect("connection");
    connection.inner_mut().tree = tree;
    connection.init(database).expect("connection init");
    connection
}

/// Run `GetObjects` and return its single batch.
pub fn get_objects_batch<C: ConnectionImpl>(
    connection: &mut Connection<C>,
    depth: i32,
    filter: &CatalogFilter,
) -> Result<RecordBatch> {
    let mut out = StreamSlot::new();
    connection.get_objects(depth, filter, Some(&mut out))?;
    let mut batches = out.take().expect("stream").collect_batches();
    assert_eq!(batches.len(), 1);
    Ok(batches.remove(0))
}
