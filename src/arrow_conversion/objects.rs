//! The fixed nested Arrow structure returned by `GetObjects`.
//!
//! The schema does not depend on the requested depth: list fields below the
//! depth the traversal reached are null.

use crate::catalog::{CatalogEntry, ColumnRecord, ConstraintRecord, ConstraintUsage, XdbcColumn};
use crate::error::Result;
use arrow::array::{
    ArrayRef, BooleanArray, Int16Array, Int32Array, ListArray, RecordBatch, StringArray,
    StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow_schema::{DataType, Field, FieldRef, Fields, Schema, SchemaRef};
use std::sync::Arc;

fn list_of(fields: Fields) -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Struct(fields), true)))
}

/// Foreign-key usage entries of a constraint.
pub fn usage_fields() -> Fields {
    Fields::from(vec![
        Field::new("fk_catalog", DataType::Utf8, true),
        Field::new("fk_db_schema", DataType::Utf8, true),
        Field::new("fk_table", DataType::Utf8, false),
        Field::new("fk_column_name", DataType::Utf8, false),
    ])
}

fn column_names_item() -> FieldRef {
    Arc::new(Field::new("item", DataType::Utf8, false))
}

pub fn constraint_fields() -> Fields {
    Fields::from(vec![
        Field::new("constraint_name", DataType::Utf8, true),
        Field::new("constraint_type", DataType::Utf8, false),
        Field::new(
            "constraint_column_names",
            DataType::List(column_names_item()),
            false,
        ),
        Field::new("constraint_column_usage", list_of(usage_fields()), true),
    ])
}

pub fn column_fields() -> Fields {
    Fields::from(vec![
        Field::new("column_name", DataType::Utf8, false),
        Field::new("ordinal_position", DataType::Int32, true),
        Field::new("remarks", DataType::Utf8, true),
        Field::new("xdbc_data_type", DataType::Int16, true),
        Field::new("xdbc_type_name", DataType::Utf8, true),
        Field::new("xdbc_column_size", DataType::Int32, true),
        Field::new("xdbc_decimal_digits", DataType::Int16, true),
        Field::new("xdbc_num_prec_radix", DataType::Int16, true),
        Field::new("xdbc_nullable", DataType::Int16, true),
        Field::new("xdbc_column_def", DataType::Utf8, true),
        Field::new("xdbc_sql_data_type", DataType::Int16, true),
        Field::new("xdbc_datetime_sub", DataType::Int16, true),
        Field::new("xdbc_char_octet_length", DataType::Int32, true),
        Field::new("xdbc_is_nullable", DataType::Utf8, true),
        Field::new("xdbc_scope_catalog", DataType::Utf8, true),
        Field::new("xdbc_scope_schema", DataType::Utf8, true),
        Field::new("xdbc_scope_table", DataType::Utf8, true),
        Field::new("xdbc_is_autoincrement", DataType::Boolean, true),
        Field::new("xdbc_is_generatedcolumn", DataType::Boolean, true),
    ])
}

pub fn table_fields() -> Fields {
    Fields::from(vec![
        Field::new("table_name", DataType::Utf8, false),
        Field::new("table_type", DataType::Utf8, false),
        Field::new("table_columns", list_of(column_fields()), true),
        Field::new("table_constraints", list_of(constraint_fields()), true),
    ])
}

pub fn db_schema_fields() -> Fields {
    Fields::from(vec![
        Field::new("db_schema_name", DataType::Utf8, true),
        Field::new("db_schema_tables", list_of(table_fields()), true),
    ])
}

/// Schema of the `GetObjects` result.
pub fn get_objects_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("catalog_name", DataType::Utf8, true),
        Field::new("catalog_db_schemas", list_of(db_schema_fields()), true),
    ]))
}

/// Item field of a list-of-struct column, taken from the schema definition
/// so array and schema types match exactly.
fn item_field(data_type: &DataType) -> FieldRef {
    match data_type {
        DataType::List(item) => Arc::clone(item),
        // list_of always produces DataType::List
        other => Arc::new(Field::new("item", other.clone(), true)),
    }
}

fn field_type(fields: &Fields, name: &str) -> DataType {
    fields
        .iter()
        .find(|f| f.name() == name)
        .map(|f| f.data_type().clone())
        .unwrap_or(DataType::Null)
}

/// Build a list array from per-row lengths; `None` marks a null list.
fn list_array(item: FieldRef, lengths: &[Option<usize>], values: ArrayRef) -> Result<ArrayRef> {
    let offsets = OffsetBuffer::<i32>::from_lengths(lengths.iter().map(|l| l.unwrap_or(0)));
    let nulls = if lengths.iter().all(Option::is_some) {
        None
    } else {
        Some(NullBuffer::from(
            lengths.iter().map(Option::is_some).collect::<Vec<bool>>(),
        ))
    };
    Ok(Arc::new(ListArray::try_new(item, offsets, values, nulls)?))
}

fn struct_array(fields: Fields, arrays: Vec<ArrayRef>) -> Result<ArrayRef> {
    Ok(Arc::new(StructArray::try_new(fields, arrays, None)?))
}

fn utf8<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> ArrayRef {
    Arc::new(values.into_iter().collect::<StringArray>())
}

fn xdbc<T>(columns: &[&ColumnRecord], get: impl Fn(&XdbcColumn) -> Option<T>) -> Vec<Option<T>> {
    columns
        .iter()
        .map(|c| c.xdbc.as_ref().and_then(&get))
        .collect()
}

fn xdbc_str<'a>(
    columns: &[&'a ColumnRecord],
    get: impl Fn(&'a XdbcColumn) -> Option<&'a String>,
) -> ArrayRef {
    utf8(
        columns
            .iter()
            .map(|c| c.xdbc.as_ref().and_then(&get).map(String::as_str)),
    )
}

fn columns_array(columns: &[&ColumnRecord]) -> Result<ArrayRef> {
    let arrays: Vec<ArrayRef> = vec![
        utf8(columns.iter().map(|c| Some(c.name.as_str()))),
        Arc::new(Int32Array::from(
            columns
                .iter()
                .map(|c| c.ordinal_position)
                .collect::<Vec<_>>(),
        )),
        utf8(columns.iter().map(|c| c.remarks.as_deref())),
        Arc::new(Int16Array::from(xdbc(columns, |x| x.data_type))),
        xdbc_str(columns, |x| x.type_name.as_ref()),
        Arc::new(Int32Array::from(xdbc(columns, |x| x.column_size))),
        Arc::new(Int16Array::from(xdbc(columns, |x| x.decimal_digits))),
        Arc::new(Int16Array::from(xdbc(columns, |x| x.num_prec_radix))),
        Arc::new(Int16Array::from(xdbc(columns, |x| x.nullable))),
        xdbc_str(columns, |x| x.column_def.as_ref()),
        Arc::new(Int16Array::from(xdbc(columns, |x| x.sql_data_type))),
        Arc::new(Int16Array::from(xdbc(columns, |x| x.datetime_sub))),
        Arc::new(Int32Array::from(xdbc(columns, |x| x.char_octet_length))),
        xdbc_str(columns, |x| x.is_nullable.as_ref()),
        xdbc_str(columns, |x| x.scope_catalog.as_ref()),
        xdbc_str(columns, |x| x.scope_schema.as_ref()),
        xdbc_str(columns, |x| x.scope_table.as_ref()),
        Arc::new(BooleanArray::from(xdbc(columns, |x| x.is_autoincrement))),
        Arc::new(BooleanArray::from(xdbc(columns, |x| x.is_generatedcolumn))),
    ];
    struct_array(column_fields(), arrays)
}

fn usage_array(usage: &[&ConstraintUsage]) -> Result<ArrayRef> {
    struct_array(
        usage_fields(),
        vec![
            utf8(usage.iter().map(|u| u.catalog.as_deref())),
            utf8(usage.iter().map(|u| u.db_schema.as_deref())),
            utf8(usage.iter().map(|u| Some(u.table.as_str()))),
            utf8(usage.iter().map(|u| Some(u.column.as_str()))),
        ],
    )
}

fn constraints_array(constraints: &[&ConstraintRecord]) -> Result<ArrayRef> {
    let fields = constraint_fields();

    let name_lengths: Vec<Option<usize>> = constraints
        .iter()
        .map(|c| Some(c.column_names.len()))
        .collect();
    let names = utf8(
        constraints
            .iter()
            .flat_map(|c| c.column_names.iter().map(|n| Some(n.as_str()))),
    );
    let column_names = list_array(column_names_item(), &name_lengths, names)?;

    let usage_lengths: Vec<Option<usize>> = constraints
        .iter()
        .map(|c| c.usage.as_ref().map(Vec::len))
        .collect();
    let usage: Vec<&ConstraintUsage> = constraints
        .iter()
        .flat_map(|c| c.usage.iter().flatten())
        .collect();
    let usage = list_array(
        item_field(&field_type(&fields, "constraint_column_usage")),
        &usage_lengths,
        usage_array(&usage)?,
    )?;

    struct_array(
        fields,
        vec![
            utf8(constraints.iter().map(|c| c.name.as_deref())),
            utf8(constraints.iter().map(|c| Some(c.constraint_type.as_str()))),
            column_names,
            usage,
        ],
    )
}

/// Serialize an assembled catalog tree into a single `RecordBatch`.
pub fn objects_to_batch(catalogs: &[CatalogEntry]) -> Result<RecordBatch> {
    let mut catalog_names = Vec::with_capacity(catalogs.len());
    let mut schema_lengths = Vec::with_capacity(catalogs.len());
    let mut schema_names = Vec::new();
    let mut table_lengths = Vec::new();
    let mut table_names = Vec::new();
    let mut table_types = Vec::new();
    let mut column_lengths = Vec::new();
    let mut constraint_lengths = Vec::new();
    let mut columns: Vec<&ColumnRecord> = Vec::new();
    let mut constraints: Vec<&ConstraintRecord> = Vec::new();

    for catalog in catalogs {
        catalog_names.push(catalog.name.as_deref());
        schema_lengths.push(catalog.db_schemas.as_ref().map(Vec::len));
        for schema in catalog.db_schemas.iter().flatten() {
            schema_names.push(schema.name.as_deref());
            table_lengths.push(schema.tables.as_ref().map(Vec::len));
            for table in schema.tables.iter().flatten() {
                table_names.push(Some(table.name.as_str()));
                table_types.push(Some(table.table_type.as_str()));
                column_lengths.push(table.columns.as_ref().map(Vec::len));
                constraint_lengths.push(table.constraints.as_ref().map(Vec::len));
                columns.extend(table.columns.iter().flatten());
                constraints.extend(table.constraints.iter().flatten());
            }
        }
    }

    let table_struct_fields = table_fields();
    let tables = struct_array(
        table_struct_fields.clone(),
        vec![
            utf8(table_names),
            utf8(table_types),
            list_array(
                item_field(&field_type(&table_struct_fields, "table_columns")),
                &column_lengths,
                columns_array(&columns)?,
            )?,
            list_array(
                item_field(&field_type(&table_struct_fields, "table_constraints")),
                &constraint_lengths,
                constraints_array(&constraints)?,
            )?,
        ],
    )?;

    let schema_struct_fields = db_schema_fields();
    let db_schemas = struct_array(
        schema_struct_fields.clone(),
        vec![
            utf8(schema_names),
            list_array(
                item_field(&field_type(&schema_struct_fields, "db_schema_tables")),
                &table_lengths,
                tables,
            )?,
        ],
    )?;

    let schema = get_objects_schema();
    let catalog_schemas = list_array(
        item_field(schema.field(1).data_type()),
        &schema_lengths,
        db_schemas,
    )?;

    Ok(RecordBatch::try_new(
        schema,
        vec![utf8(catalog_names), catalog_schemas],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SchemaEntry, TableEntry};
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::Int32Type;

    fn sample_tree() -> Vec<CatalogEntry> {
        vec![CatalogEntry {
            name: Some("c1".to_string()),
            db_schemas: Some(vec![SchemaEntry {
                name: Some("s1".to_string()),
                tables: Some(vec![TableEntry {
                    name: "t1".to_string(),
                    table_type: "TABLE".to_string(),
                    columns: Some(vec![
                        ColumnRecord::new("id").with_ordinal(1),
                        ColumnRecord::new("parent_id")
                            .with_ordinal(2)
                            .with_remarks("references t1")
                            .with_xdbc(XdbcColumn {
                                type_name: Some("INTEGER".to_string()),
                                is_autoincrement: Some(false),
                                ..Default::default()
                            }),
                    ]),
                    constraints: Some(vec![
                        ConstraintRecord::new("PRIMARY KEY", ["id"]).with_name("pk_t1"),
                        ConstraintRecord::new("FOREIGN KEY", ["parent_id"]).with_usage(vec![
                            ConstraintUsage {
                                catalog: Some("c1".to_string()),
                                db_schema: Some("s1".to_string()),
                                table: "t1".to_string(),
                                column: "id".to_string(),
                            },
                        ]),
                    ]),
                }]),
            }]),
        }]
    }

    #[test]
    fn test_schema_shape() {
        let schema = get_objects_schema();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.field(0).name(), "catalog_name");
        assert_eq!(schema.field(1).name(), "catalog_db_schemas");
        assert_eq!(column_fields().len(), 19);
        assert_eq!(usage_fields().len(), 4);
    }

    #[test]
    fn test_empty_tree() {
        let batch = objects_to_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.schema(), get_objects_schema());
    }

    #[test]
    fn test_catalog_depth_has_null_schemas() {
        let tree = vec![
            CatalogEntry {
                name: Some("a".to_string()),
                db_schemas: None,
            },
            CatalogEntry {
                name: None,
                db_schemas: None,
            },
        ];
        let batch = objects_to_batch(&tree).unwrap();
        assert_eq!(batch.num_rows(), 2);

        let names = batch.column(0).as_string::<i32>();
        assert_eq!(names.value(0), "a");
        assert!(names.is_null(1));

        let schemas = batch.column(1).as_list::<i32>();
        assert!(schemas.is_null(0));
        assert!(schemas.is_null(1));
    }

    #[test]
    fn test_full_tree() {
        let batch = objects_to_batch(&sample_tree()).unwrap();
        assert_eq!(batch.num_rows(), 1);

        let schemas = batch.column(1).as_list::<i32>();
        let schema_struct = schemas.value(0);
        let schema_struct = schema_struct.as_struct();
        assert_eq!(schema_struct.len(), 1);
        assert_eq!(
            schema_struct.column(0).as_string::<i32>().value(0),
            "s1"
        );

        let tables = schema_struct.column(1).as_list::<i32>().value(0);
        let tables = tables.as_struct();
        assert_eq!(tables.column(0).as_string::<i32>().value(0), "t1");
        assert_eq!(tables.column(1).as_string::<i32>().value(0), "TABLE");

        let columns = tables.column(2).as_list::<i32>().value(0);
        let columns = columns.as_struct();
        assert_eq!(columns.len(), 2);
        let ordinals = columns.column(1).as_primitive::<Int32Type>();
        assert_eq!(ordinals.value(0), 1);
        assert_eq!(ordinals.value(1), 2);
        let remarks = columns.column(2).as_string::<i32>();
        assert!(remarks.is_null(0));
        assert_eq!(remarks.value(1), "references t1");
        let type_names = columns.column(4).as_string::<i32>();
        assert!(type_names.is_null(0));
        assert_eq!(type_names.value(1), "INTEGER");

        let constraints = tables.column(3).as_list::<i32>().value(0);
        let constraints = constraints.as_struct();
        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints.column(0).as_string::<i32>().value(0), "pk_t1");
        assert!(constraints.column(0).is_null(1));
        let usage = constraints.column(3).as_list::<i32>();
        assert!(usage.is_null(0));
        assert_eq!(usage.value(1).len(), 1);
    }

    #[test]
    fn test_tables_depth_has_null_columns() {
        let tree = vec![CatalogEntry {
            name: Some("c".to_string()),
            db_schemas: Some(vec![SchemaEntry {
                name: None,
                tables: Some(vec![TableEntry {
                    name: "t".to_string(),
                    table_type: "VIEW".to_string(),
                    columns: None,
                    constraints: None,
                }]),
            }]),
        }];
        let batch = objects_to_batch(&tree).unwrap();
        let schemas = batch.column(1).as_list::<i32>().value(0);
        let tables = schemas.as_struct().column(1).as_list::<i32>().value(0);
        let tables = tables.as_struct();
        assert!(tables.column(2).is_null(0));
        assert!(tables.column(3).is_null(0));
    }
}
