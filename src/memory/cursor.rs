//! Catalog cursor over a [`MemoryCatalog`].

use super::catalog::{CatalogDef, ColumnDef, ConstraintDef, MemoryCatalog, SchemaDef, TableDef};
use super::pattern::{passes, LikePattern};
use crate::catalog::{
    CatalogCursor, CatalogRecord, ColumnRecord, ConstraintRecord, SchemaRecord, TableRecord,
};
use crate::error::{Result, Status};
use std::collections::VecDeque;

/// Pull cursor over an in-memory catalog. Filters are LIKE-style patterns;
/// table types match exactly.
#[derive(Debug)]
pub struct MemoryCursor<'a> {
    catalog: &'a MemoryCatalog,
    catalogs: VecDeque<&'a CatalogDef>,
    schemas: VecDeque<&'a SchemaDef>,
    tables: VecDeque<&'a TableDef>,
    columns: VecDeque<&'a ColumnDef>,
    constraints: VecDeque<&'a ConstraintDef>,
    closed: bool,
}

impl<'a> MemoryCursor<'a> {
    pub fn new(catalog: &'a MemoryCatalog) -> Self {
        Self {
            catalog,
            catalogs: VecDeque::new(),
            schemas: VecDeque::new(),
            tables: VecDeque::new(),
            columns: VecDeque::new(),
            constraints: VecDeque::new(),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn catalog_def(&self, name: Option<&str>) -> Result<&'a CatalogDef> {
        self.catalog
            .find_catalog(name)
            .ok_or_else(|| Status::not_found(format!("Unknown catalog {:?}", name)))
    }

    fn schema_def(&self, catalog: Option<&str>, schema: Option<&str>) -> Result<&'a SchemaDef> {
        self.catalog_def(catalog)?
            .find_schema(schema)
            .ok_or_else(|| Status::not_found(format!("Unknown schema {:?}", schema)))
    }
}

impl CatalogCursor for MemoryCursor<'_> {
    fn load_catalogs(&mut self, catalog_filter: Option<&str>) -> Result<()> {
        let filter = LikePattern::compile(catalog_filter)?;
        self.catalogs = self
            .catalog
            .catalogs
            .iter()
            .filter(|c| passes(filter.as_ref(), c.name.as_deref()))
            .collect();
        tracing::trace!(count = self.catalogs.len(), "Loaded catalogs");
        Ok(())
    }

    fn next_catalog(&mut self) -> Result<Option<CatalogRecord>> {
        Ok(self.catalogs.pop_front().map(|c| CatalogRecord {
            name: c.name.clone(),
        }))
    }

    fn load_schemas(&mut self, catalog: Option<&str>, schema_filter: Option<&str>) -> Result<()> {
        let filter = LikePattern::compile(schema_filter)?;
        self.schemas = self
            .catalog_def(catalog)?
            .schemas
            .iter()
            .filter(|s| passes(filter.as_ref(), s.name.as_deref()))
            .collect();
        Ok(())
    }

    fn next_schema(&mut self) -> Result<Option<SchemaRecord>> {
        Ok(self.schemas.pop_front().map(|s| SchemaRecord {
            name: s.name.clone(),
        }))
    }

    fn load_tables(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table_filter: Option<&str>,
        table_types: Option<&[String]>,
    ) -> Result<()> {
        let filter = LikePattern::compile(table_filter)?;
        let type_accepted = |table_type: &str| match table_types {
            Some(types) if !types.is_empty() => types.iter().any(|t| t == table_type),
            _ => true,
        };
        self.tables = self
            .schema_def(catalog, schema)?
            .tables
            .iter()
            .filter(|t| {
                passes(filter.as_ref(), Some(t.name.as_str())) && type_accepted(&t.table_type)
            })
            .collect();
        Ok(())
    }

    fn next_table(&mut self) -> Result<Option<TableRecord>> {
        Ok(self
            .tables
            .pop_front()
            .map(|t| TableRecord::new(t.name.as_str(), t.table_type.as_str())))
    }

    fn load_columns(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
        column_filter: Option<&str>,
    ) -> Result<()> {
        let filter = LikePattern::compile(column_filter)?;
        let table_def = self
            .schema_def(catalog, schema)?
            .find_table(table)
            .ok_or_else(|| Status::not_found(format!("Unknown table {}", table)))?;
        self.columns = table_def
            .columns
            .iter()
            .filter(|c| passes(filter.as_ref(), Some(c.name.as_str())))
            .collect();
        self.constraints = table_def.constraints.iter().collect();
        Ok(())
    }

    fn next_column(&mut self) -> Result<Option<ColumnRecord>> {
        Ok(self.columns.pop_front().map(ColumnRecord::from))
    }

    fn next_constraint(&mut self) -> Result<Option<ConstraintRecord>> {
        Ok(self.constraints.pop_front().map(ConstraintRecord::from))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.catalogs.clear();
        self.schemas.clear();
        self.tables.clear();
        self.columns.clear();
        self.constraints.clear();
        Ok(())
    }
}
