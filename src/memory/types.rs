//! Mapping of SQL type names (as reported in XDBC metadata) to Arrow types.

use crate::error::{Result, Status};
use arrow_schema::{DataType, TimeUnit};

/// Convert a SQL type name such as `VARCHAR(20)` or `DECIMAL(10, 2)` to an
/// Arrow data type.
///
/// # Errors
///
/// Returns `NotImplemented` for type names with no Arrow equivalent here, and
/// `InvalidArgument` for malformed precision/scale arguments.
pub fn sql_to_arrow(type_name: &str) -> Result<DataType> {
    let normalized = type_name.trim().to_ascii_uppercase();
    let (base, args) = match normalized.find('(') {
        Some(open) => {
            let close = normalized.rfind(')').unwrap_or(normalized.len());
            let args = normalized
                .get(open + 1..close)
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(|a| {
                    a.parse::<i64>().map_err(|_| {
                        Status::invalid_argument(format!(
                            "Invalid type argument '{}' in {}",
                            a, type_name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            (normalized[..open].trim().to_string(), args)
        }
        None => (normalized.clone(), Vec::new()),
    };

    match base.as_str() {
        "BOOLEAN" | "BOOL" => Ok(DataType::Boolean),
        "TINYINT" => Ok(DataType::Int8),
        "SMALLINT" => Ok(DataType::Int16),
        "INT" | "INTEGER" => Ok(DataType::Int32),
        "BIGINT" => Ok(DataType::Int64),
        "REAL" | "FLOAT" => Ok(DataType::Float32),
        "DOUBLE" | "DOUBLE PRECISION" => Ok(DataType::Float64),
        "CHAR" | "VARCHAR" | "TEXT" | "STRING" => Ok(DataType::Utf8),
        "BINARY" | "VARBINARY" | "BLOB" => Ok(DataType::Binary),
        "DATE" => Ok(DataType::Date32),
        "TIMESTAMP" => Ok(DataType::Timestamp(TimeUnit::Microsecond, None)),
        "DECIMAL" | "NUMERIC" => {
            let precision = args.first().copied().unwrap_or(38);
            let scale = args.get(1).copied().unwrap_or(0);
            let precision = u8::try_from(precision)
                .ok()
                .filter(|p| (1..=76).contains(p))
                .ok_or_else(|| {
                    Status::invalid_argument(format!("Invalid precision in {}", type_name))
                })?;
            let scale = i8::try_from(scale).map_err(|_| {
                Status::invalid_argument(format!("Invalid scale in {}", type_name))
            })?;
            if precision <= 38 {
                Ok(DataType::Decimal128(precision, scale))
            } else {
                Ok(DataType::Decimal256(precision, scale))
            }
        }
        _ => Err(Status::not_implemented(format!(
            "Unsupported column type {}",
            type_name
        ))),
    }
}
