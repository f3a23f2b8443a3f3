//! Depth- and filter-aware traversal of a [`CatalogCursor`].
//!
//! The traversal is depth-first and all-or-nothing: the first failing cursor
//! call aborts it, the partial tree is dropped and that status is returned
//! unchanged. The cursor is closed exactly once on every path.

use super::{
    CatalogCursor, CatalogFilter, CatalogRecord, ColumnRecord, ConstraintRecord, CursorGuard,
    ObjectDepth, SchemaRecord, TableRecord,
};
use crate::arrow_conversion::objects::objects_to_batch;
use crate::error::{Result, Status};
use arrow::array::RecordBatch;

/// A catalog and, below catalog depth, its schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: Option<String>,
    /// `None` when the traversal stopped at catalogs
    pub db_schemas: Option<Vec<SchemaEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub name: Option<String>,
    /// `None` when the traversal stopped at schemas
    pub tables: Option<Vec<TableEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    pub table_type: String,
    /// `None` when the traversal stopped at tables; otherwise every column
    /// carries its final ordinal position.
    pub columns: Option<Vec<ColumnRecord>>,
    pub constraints: Option<Vec<ConstraintRecord>>,
}

/// Run `GetObjects` against a cursor: traverse, close, then serialize.
///
/// The traversal status takes precedence over the close status.
pub fn build_get_objects<C: CatalogCursor>(
    cursor: C,
    depth: ObjectDepth,
    filter: &CatalogFilter,
) -> Result<RecordBatch> {
    let mut guard = CursorGuard::new(cursor);
    let traversal = CatalogBuilder::new(depth, filter).build(guard.cursor());
    let closed = guard.close();
    let catalogs = traversal?;
    closed?;
    objects_to_batch(&catalogs)
}

/// Drives a cursor level by level down to a fixed depth.
#[derive(Debug)]
pub struct CatalogBuilder<'f> {
    depth: ObjectDepth,
    filter: &'f CatalogFilter,
}

impl<'f> CatalogBuilder<'f> {
    pub fn new(depth: ObjectDepth, filter: &'f CatalogFilter) -> Self {
        Self { depth, filter }
    }

    /// Traverse the cursor and assemble the catalog tree.
    ///
    /// Does not close the cursor.
    pub fn build<C: CatalogCursor + ?Sized>(&self, cursor: &mut C) -> Result<Vec<CatalogEntry>> {
        tracing::debug!(depth = %self.depth, filter = ?self.filter, "Building GetObjects result");

        let mut cursor = Protocol::new(cursor);
        cursor.prefetch(self.depth, self.filter)?;
        cursor.load_catalogs(self.filter.catalog.as_deref())?;

        let mut catalogs = Vec::new();
        while let Some(catalog) = cursor.next_catalog()? {
            let db_schemas = if self.depth.includes(ObjectDepth::Schemas) {
                Some(self.build_schemas(&mut cursor, &catalog)?)
            } else {
                None
            };
            catalogs.push(CatalogEntry {
                name: catalog.name,
                db_schemas,
            });
        }

        tracing::debug!(catalogs = catalogs.len(), "GetObjects traversal complete");
        Ok(catalogs)
    }

    fn build_schemas<C: CatalogCursor + ?Sized>(
        &self,
        cursor: &mut Protocol<'_, C>,
        catalog: &CatalogRecord,
    ) -> Result<Vec<SchemaEntry>> {
        cursor.load_schemas(catalog.name.as_deref(), self.filter.db_schema.as_deref())?;

        let mut schemas = Vec::new();
        while let Some(schema) = cursor.next_schema()? {
            let tables = if self.depth.includes(ObjectDepth::Tables) {
                Some(self.build_tables(cursor, catalog, &schema)?)
            } else {
                None
            };
            schemas.push(SchemaEntry {
                name: schema.name,
                tables,
            });
        }
        Ok(schemas)
    }

    fn build_tables<C: CatalogCursor + ?Sized>(
        &self,
        cursor: &mut Protocol<'_, C>,
        catalog: &CatalogRecord,
        schema: &SchemaRecord,
    ) -> Result<Vec<TableEntry>> {
        cursor.load_tables(
            catalog.name.as_deref(),
            schema.name.as_deref(),
            self.filter.table_name.as_deref(),
            self.filter.table_types.as_deref(),
        )?;

        let mut tables = Vec::new();
        while let Some(table) = cursor.next_table()? {
            let (columns, constraints) = if self.depth.includes(ObjectDepth::Columns) {
                let columns = self.build_columns(cursor, catalog, schema, &table)?;
                let mut constraints = Vec::new();
                while let Some(constraint) = cursor.next_constraint()? {
                    constraints.push(constraint);
                }
                (Some(columns), Some(constraints))
            } else {
                (None, None)
            };
            tables.push(TableEntry {
                name: table.name,
                table_type: table.table_type,
                columns,
                constraints,
            });
        }
        Ok(tables)
    }

    fn build_columns<C: CatalogCursor + ?Sized>(
        &self,
        cursor: &mut Protocol<'_, C>,
        catalog: &CatalogRecord,
        schema: &SchemaRecord,
        table: &TableRecord,
    ) -> Result<Vec<ColumnRecord>> {
        cursor.load_columns(
            catalog.name.as_deref(),
            schema.name.as_deref(),
            &table.name,
            self.filter.column_name.as_deref(),
        )?;

        let mut columns = Vec::new();
        let mut last_ordinal = 0;
        while let Some(mut column) = cursor.next_column()? {
            let ordinal = next_ordinal(last_ordinal, &table.name, &column)?;
            column.ordinal_position = Some(ordinal);
            last_ordinal = ordinal;
            columns.push(column);
        }
        Ok(columns)
    }
}

/// Assign or validate a column's 1-based ordinal position.
fn next_ordinal(last: i32, table: &str, column: &ColumnRecord) -> Result<i32> {
    match column.ordinal_position {
        None => last.checked_add(1).ok_or_else(|| {
            Status::internal(format!("Table {}: too many columns", table))
        }),
        Some(ordinal) if ordinal >= 1 && ordinal > last => Ok(ordinal),
        Some(ordinal) => Err(Status::internal(format!(
            "Table {}: column {} has ordinal position {}, expected a value greater than {}",
            table, column.name, ordinal, last
        ))),
    }
}

/// Cursor levels in nesting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Catalogs = 0,
    Schemas = 1,
    Tables = 2,
    Columns = 3,
}

impl Level {
    fn name(self) -> &'static str {
        match self {
            Level::Catalogs => "catalogs",
            Level::Schemas => "schemas",
            Level::Tables => "tables",
            Level::Columns => "columns",
        }
    }

    fn parent(self) -> Option<Level> {
        match self {
            Level::Catalogs => None,
            Level::Schemas => Some(Level::Catalogs),
            Level::Tables => Some(Level::Schemas),
            Level::Columns => Some(Level::Tables),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelState {
    /// Never loaded
    Idle,
    /// Loaded; `next_*` may be called
    Open,
    /// `next_*` returned `None`
    Drained,
}

/// Wraps a cursor and enforces the per-level call protocol.
///
/// `load_*` is legal when the level is not open and its parent is open;
/// `next_*` is legal only while the level is open. Constraints are read after
/// the current table's columns are drained. A violation is an Internal
/// status and the wrapped cursor is not called.
struct Protocol<'c, C: CatalogCursor + ?Sized> {
    cursor: &'c mut C,
    states: [LevelState; 4],
}

impl<'c, C: CatalogCursor + ?Sized> Protocol<'c, C> {
    fn new(cursor: &'c mut C) -> Self {
        Self {
            cursor,
            states: [LevelState::Idle; 4],
        }
    }

    fn state(&self, level: Level) -> LevelState {
        self.states[level as usize]
    }

    fn begin_load(&mut self, level: Level) -> Result<()> {
        if self.state(level) == LevelState::Open {
            return Err(Status::internal(format!(
                "Catalog cursor protocol violated: {} loaded before being drained",
                level.name()
            )));
        }
        if let Some(parent) = level.parent() {
            if self.state(parent) != LevelState::Open {
                return Err(Status::internal(format!(
                    "Catalog cursor protocol violated: {} loaded outside of {}",
                    level.name(),
                    parent.name()
                )));
            }
        }
        tracing::trace!(level = level.name(), "Loading catalog level");
        Ok(())
    }

    fn begin_next(&self, level: Level) -> Result<()> {
        if self.state(level) != LevelState::Open {
            return Err(Status::internal(format!(
                "Catalog cursor protocol violated: next on {} before load",
                level.name()
            )));
        }
        Ok(())
    }

    fn finish_next<T>(&mut self, level: Level, item: Option<T>) -> Option<T> {
        if item.is_none() {
            self.states[level as usize] = LevelState::Drained;
        }
        item
    }

    fn prefetch(&mut self, depth: ObjectDepth, filter: &CatalogFilter) -> Result<()> {
        self.cursor.prefetch(depth, filter)
    }

    fn load_catalogs(&mut self, catalog_filter: Option<&str>) -> Result<()> {
        self.begin_load(Level::Catalogs)?;
        self.cursor.load_catalogs(catalog_filter)?;
        self.states[Level::Catalogs as usize] = LevelState::Open;
        Ok(())
    }

    fn next_catalog(&mut self) -> Result<Option<CatalogRecord>> {
        self.begin_next(Level::Catalogs)?;
        let item = self.cursor.next_catalog()?;
        Ok(self.finish_next(Level::Catalogs, item))
    }

    fn load_schemas(&mut self, catalog: Option<&str>, schema_filter: Option<&str>) -> Result<()> {
        self.begin_load(Level::Schemas)?;
        self.cursor.load_schemas(catalog, schema_filter)?;
        self.states[Level::Schemas as usize] = LevelState::Open;
        Ok(())
    }

    fn next_schema(&mut self) -> Result<Option<SchemaRecord>> {
        self.begin_next(Level::Schemas)?;
        let item = self.cursor.next_schema()?;
        Ok(self.finish_next(Level::Schemas, item))
    }

    fn load_tables(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table_filter: Option<&str>,
        table_types: Option<&[String]>,
    ) -> Result<()> {
        self.begin_load(Level::Tables)?;
        self.cursor
            .load_tables(catalog, schema, table_filter, table_types)?;
        self.states[Level::Tables as usize] = LevelState::Open;
        Ok(())
    }

    fn next_table(&mut self) -> Result<Option<TableRecord>> {
        self.begin_next(Level::Tables)?;
        let item = self.cursor.next_table()?;
        Ok(self.finish_next(Level::Tables, item))
    }

    fn load_columns(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
        column_filter: Option<&str>,
    ) -> Result<()> {
        self.begin_load(Level::Columns)?;
        self.cursor
            .load_columns(catalog, schema, table, column_filter)?;
        self.states[Level::Columns as usize] = LevelState::Open;
        Ok(())
    }

    fn next_column(&mut self) -> Result<Option<ColumnRecord>> {
        self.begin_next(Level::Columns)?;
        let item = self.cursor.next_column()?;
        Ok(self.finish_next(Level::Columns, item))
    }

    fn next_constraint(&mut self) -> Result<Option<ConstraintRecord>> {
        if self.state(Level::Tables) != LevelState::Open
            || self.state(Level::Columns) != LevelState::Drained
        {
            return Err(Status::internal(
                "Catalog cursor protocol violated: constraints read outside of a table",
            ));
        }
        self.cursor.next_constraint()
    }
}
