//! `GetInfo` and `GetTableTypes` result structures.

use crate::error::Result;
use arrow::array::{
    new_empty_array, ArrayRef, BooleanArray, Int64Array, RecordBatch, StringArray, UInt32Array,
    UnionArray,
};
use arrow::buffer::ScalarBuffer;
use arrow_schema::{DataType, Field, Fields, Schema, SchemaRef, UnionFields, UnionMode};
use std::sync::Arc;

pub const INFO_VENDOR_NAME: u32 = 0;
pub const INFO_VENDOR_VERSION: u32 = 1;
pub const INFO_VENDOR_ARROW_VERSION: u32 = 2;
pub const INFO_DRIVER_NAME: u32 = 100;
pub const INFO_DRIVER_VERSION: u32 = 101;
pub const INFO_DRIVER_ARROW_VERSION: u32 = 102;
pub const INFO_DRIVER_ADBC_VERSION: u32 = 103;

const STRING_VALUE: i8 = 0;
const BOOL_VALUE: i8 = 1;
const INT64_VALUE: i8 = 2;

/// A single `GetInfo` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoValue {
    String(String),
    Bool(bool),
    Int64(i64),
}

impl From<&str> for InfoValue {
    fn from(value: &str) -> Self {
        InfoValue::String(value.to_string())
    }
}

impl From<String> for InfoValue {
    fn from(value: String) -> Self {
        InfoValue::String(value)
    }
}

impl From<bool> for InfoValue {
    fn from(value: bool) -> Self {
        InfoValue::Bool(value)
    }
}

impl From<i64> for InfoValue {
    fn from(value: i64) -> Self {
        InfoValue::Int64(value)
    }
}

fn info_union_fields() -> UnionFields {
    let int32_list = DataType::List(Arc::new(Field::new("item", DataType::Int32, true)));
    let map_entries = Field::new(
        "entries",
        DataType::Struct(Fields::from(vec![
            Field::new("key", DataType::Int32, false),
            Field::new("value", int32_list, true),
        ])),
        false,
    );
    UnionFields::new(
        0..6,
        vec![
            Field::new("string_value", DataType::Utf8, true),
            Field::new("bool_value", DataType::Boolean, true),
            Field::new("int64_value", DataType::Int64, true),
            Field::new("int32_bitmask", DataType::Int32, true),
            Field::new(
                "string_list",
                DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
                true,
            ),
            Field::new(
                "int32_to_int32_list_map",
                DataType::Map(Arc::new(map_entries), false),
                true,
            ),
        ],
    )
}

/// Schema of the `GetInfo` result.
pub fn get_info_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("info_name", DataType::UInt32, false),
        Field::new(
            "info_value",
            DataType::Union(info_union_fields(), UnionMode::Dense),
            true,
        ),
    ]))
}

/// Build the `GetInfo` batch from `(code, value)` pairs, in the given order.
pub fn info_to_batch(values: &[(u32, InfoValue)]) -> Result<RecordBatch> {
    let mut type_ids = Vec::with_capacity(values.len());
    let mut offsets = Vec::with_capacity(values.len());
    let mut strings: Vec<&str> = Vec::new();
    let mut bools = Vec::new();
    let mut ints = Vec::new();

    for (_, value) in values {
        let (type_id, offset) = match value {
            InfoValue::String(s) => {
                strings.push(s.as_str());
                (STRING_VALUE, strings.len() - 1)
            }
            InfoValue::Bool(b) => {
                bools.push(*b);
                (BOOL_VALUE, bools.len() - 1)
            }
            InfoValue::Int64(i) => {
                ints.push(*i);
                (INT64_VALUE, ints.len() - 1)
            }
        };
        type_ids.push(type_id);
        offsets.push(offset as i32);
    }

    let fields = info_union_fields();
    let mut children: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(strings)),
        Arc::new(BooleanArray::from(bools)),
        Arc::new(Int64Array::from(ints)),
    ];
    for (_, field) in fields.iter().skip(children.len()) {
        children.push(new_empty_array(field.data_type()));
    }

    let union = UnionArray::try_new(
        fields,
        ScalarBuffer::from(type_ids),
        Some(ScalarBuffer::from(offsets)),
        children,
    )?;
    let names = UInt32Array::from(values.iter().map(|(code, _)| *code).collect::<Vec<_>>());

    Ok(RecordBatch::try_new(
        get_info_schema(),
        vec![Arc::new(names), Arc::new(union)],
    )?)
}

/// Schema of the `GetTableTypes` result.
pub fn get_table_types_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![Field::new(
        "table_type",
        DataType::Utf8,
        false,
    )]))
}

pub fn table_types_to_batch(table_types: &[String]) -> Result<RecordBatch> {
    let column = StringArray::from_iter_values(table_types.iter());
    Ok(RecordBatch::try_new(
        get_table_types_schema(),
        vec![Arc::new(column)],
    )?)
}
