//! The catalog cursor contract drivers implement for `GetObjects`.

use super::{
    CatalogFilter, CatalogRecord, ColumnRecord, ConstraintRecord, ObjectDepth, SchemaRecord,
    TableRecord,
};
use crate::error::{Result, Status};

/// Stateful, single-use, multi-level pull iterator over catalog metadata.
///
/// For each level, the builder calls `load_*` exactly once for a given parent
/// and then `next_*` until it returns `None`. Constraints have no `load`:
/// `next_constraint` is drained per table right after its columns. The cursor
/// applies the filters it is given; the builder never re-filters.
///
/// `close` is called exactly once per `GetObjects` call, whatever the
/// outcome.
pub trait CatalogCursor {
    /// Optional bulk load, called once before any other method. Drivers that
    /// can fetch all metadata up front do it here.
    fn prefetch(&mut self, _depth: ObjectDepth, _filter: &CatalogFilter) -> Result<()> {
        Ok(())
    }

    fn load_catalogs(&mut self, _catalog_filter: Option<&str>) -> Result<()> {
        Err(Status::not_implemented("GetObjects at depth = catalog"))
    }

    fn next_catalog(&mut self) -> Result<Option<CatalogRecord>> {
        Ok(None)
    }

    fn load_schemas(&mut self, _catalog: Option<&str>, _schema_filter: Option<&str>) -> Result<()> {
        Err(Status::not_implemented("GetObjects at depth = schema"))
    }

    fn next_schema(&mut self) -> Result<Option<SchemaRecord>> {
        Ok(None)
    }

    fn load_tables(
        &mut self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        _table_filter: Option<&str>,
        _table_types: Option<&[String]>,
    ) -> Result<()> {
        Err(Status::not_implemented("GetObjects at depth = table"))
    }

    fn next_table(&mut self) -> Result<Option<TableRecord>> {
        Ok(None)
    }

    fn load_columns(
        &mut self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        _table: &str,
        _column_filter: Option<&str>,
    ) -> Result<()> {
        Err(Status::not_implemented("GetObjects at depth = column"))
    }

    fn next_column(&mut self) -> Result<Option<ColumnRecord>> {
        Ok(None)
    }

    fn next_constraint(&mut self) -> Result<Option<ConstraintRecord>> {
        Ok(None)
    }

    /// Release driver-held resources.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<C: CatalogCursor + ?Sized> CatalogCursor for Box<C> {
    fn prefetch(&mut self, depth: ObjectDepth, filter: &CatalogFilter) -> Result<()> {
        (**self).prefetch(depth, filter)
    }

    fn load_catalogs(&mut self, catalog_filter: Option<&str>) -> Result<()> {
        (**self).load_catalogs(catalog_filter)
    }

    fn next_catalog(&mut self) -> Result<Option<CatalogRecord>> {
        (**self).next_catalog()
    }

    fn load_schemas(&mut self, catalog: Option<&str>, schema_filter: Option<&str>) -> Result<()> {
        (**self).load_schemas(catalog, schema_filter)
    }

    fn next_schema(&mut self) -> Result<Option<SchemaRecord>> {
        (**self).next_schema()
    }

    fn load_tables(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table_filter: Option<&str>,
        table_types: Option<&[String]>,
    ) -> Result<()> {
        (**self).load_tables(catalog, schema, table_filter, table_types)
    }

    fn next_table(&mut self) -> Result<Option<TableRecord>> {
        (**self).next_table()
    }

    fn load_columns(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
        column_filter: Option<&str>,
    ) -> Result<()> {
        (**self).load_columns(catalog, schema, table, column_filter)
    }

    fn next_column(&mut self) -> Result<Option<ColumnRecord>> {
        (**self).next_column()
    }

    fn next_constraint(&mut self) -> Result<Option<ConstraintRecord>> {
        (**self).next_constraint()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Owns a cursor for the duration of one `GetObjects` call and closes it
/// exactly once.
///
/// Call [`CursorGuard::close`] to observe the close status. If the guard is
/// dropped without that (early return or unwinding), the cursor is closed in
/// `Drop` and a failure is logged.
pub struct CursorGuard<C: CatalogCursor> {
    cursor: C,
    closed: bool,
}

impl<C: CatalogCursor> CursorGuard<C> {
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            closed: false,
        }
    }

    pub fn cursor(&mut self) -> &mut C {
        &mut self.cursor
    }

    /// Close the cursor now and return its status.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.cursor.close()
    }
}

impl<C: CatalogCursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(status) = self.cursor.close() {
                tracing::warn!(error = %status, "Failed to close catalog cursor");
            }
        }
    }
}
