//! ADBC Driver Manager Integration Tests for adbc-driver-kit.
//!
//! These tests load the in-memory reference driver through the ADBC driver
//! manager, which simulates how external applications (Python, R, etc.)
//! would interact with a driver built on this framework.
//!
//! # Prerequisites
//!
//! The FFI library must be built first:
//!
//! ```bash
//! cargo build --release --features ffi
//! ```
//!
//! # Running These Tests
//!
//! ```bash
//! cargo test --features ffi --test driver_manager_tests
//!
//! # Run with verbose output
//! cargo test --features ffi --test driver_manager_tests -- --nocapture
//! ```
//!
//! Tests skip themselves when the library has not been built.

#![cfg(feature = "ffi")]

use adbc_core::error::Status as AdbcStatus;
use adbc_core::options::{AdbcVersion, ObjectDepth, OptionConnection, OptionDatabase, OptionValue};
use adbc_core::{Connection as AdbcConnection, Database, Driver, Optionable, Statement};
use adbc_driver_manager::ManagedDriver;
use arrow_array::{cast::AsArray, Array, RecordBatch, RecordBatchReader};
use std::path::Path;

const ENTRY_POINT: &[u8] = b"AdbcDriverKitMemoryInit";

const CATALOG_JSON: &str = r#"{"catalogs": [
    {"name": "main", "schemas": [
        {"name": "public", "tables": [
            {"name": "users", "columns": [
                {"name": "id", "xdbc": {"type_name": "BIGINT", "nullable": 0}},
                {"name": "email", "xdbc": {"type_name": "VARCHAR(255)"}}
            ]}
        ]}
    ]}
]}"#;

// ============================================================================
// Helper Functions
// ============================================================================

/// Get the path to the built shared library.
///
/// Returns the appropriate library path based on the operating system:
/// - macOS: `target/release/libadbc_driver_kit.dylib`
/// - Linux: `target/release/libadbc_driver_kit.so`
fn get_library_path() -> &'static str {
    if cfg!(target_os = "macos") {
        "target/release/libadbc_driver_kit.dylib"
    } else {
        "target/release/libadbc_driver_kit.so"
    }
}

/// Check if the FFI library has been built.
fn is_library_available() -> bool {
    Path::new(get_library_path()).exists()
}

fn load_driver() -> ManagedDriver {
    ManagedDriver::load_dynamic_from_filename(
        get_library_path(),
        Some(ENTRY_POINT),
        AdbcVersion::V110,
    )
    .expect("Failed to load driver")
}

fn catalog_options() -> Vec<(OptionDatabase, OptionValue)> {
    vec![(
        OptionDatabase::Other("adbc.memory.catalog".to_string()),
        OptionValue::String(CATALOG_JSON.to_string()),
    )]
}

fn collect(reader: impl RecordBatchReader) -> Vec<RecordBatch> {
    reader
        .map(|batch| batch.expect("Failed to read batch"))
        .collect()
}

/// Skip test if the FFI library is not built.
macro_rules! skip_if_no_library {
    () => {
        if !is_library_available() {
            eprintln!(
                "Skipping test: FFI library not built. Run: cargo build --release --features ffi"
            );
            return;
        }
    };
}

// ============================================================================
// Driver Loading Tests
// ============================================================================

#[test]
fn test_driver_manager_loads_driver() {
    skip_if_no_library!();

    let driver_result = ManagedDriver::load_dynamic_from_filename(
        get_library_path(),
        Some(ENTRY_POINT),
        AdbcVersion::V110,
    );
    assert!(
        driver_result.is_ok(),
        "Failed to load driver: {:?}",
        driver_result.err()
    );
}

#[test]
fn test_driver_manager_wrong_entry_point_fails() {
    skip_if_no_library!();

    let driver_result = ManagedDriver::load_dynamic_from_filename(
        get_library_path(),
        Some(b"NonExistentDriverInit"),
        AdbcVersion::V110,
    );
    assert!(
        driver_result.is_err(),
        "Loading with wrong entry point should fail"
    );
}

// ============================================================================
// Database and Option Tests
// ============================================================================

#[test]
fn test_driver_manager_creates_database_with_catalog() {
    skip_if_no_library!();

    let mut driver = load_driver();
    let db_result = driver.new_database_with_opts(catalog_options());
    assert!(
        db_result.is_ok(),
        "Database creation with options should succeed: {:?}",
        db_result.err()
    );
}

#[test]
fn test_driver_manager_rejects_unknown_database_option() {
    skip_if_no_library!();

    let mut driver = load_driver();
    let opts = vec![(
        OptionDatabase::Other("adbc.memory.bogus".to_string()),
        OptionValue::String("x".to_string()),
    )];
    let err = driver.new_database_with_opts(opts).err().unwrap();
    assert_eq!(err.status, AdbcStatus::NotImplemented);
    assert!(err.message.contains("Unknown database option"));
}

#[test]
fn test_driver_manager_invalid_catalog_json() {
    skip_if_no_library!();

    let mut driver = load_driver();
    let opts = vec![(
        OptionDatabase::Other("adbc.memory.catalog".to_string()),
        OptionValue::String("{not json".to_string()),
    )];
    let err = driver.new_database_with_opts(opts).err().unwrap();
    assert_eq!(err.status, AdbcStatus::InvalidArguments);
}

// ============================================================================
// Transaction Tests
// ============================================================================

#[test]
fn test_driver_manager_autocommit_and_commit() {
    skip_if_no_library!();

    let mut driver = load_driver();
    let db = driver
        .new_database_with_opts(catalog_options())
        .expect("Failed to create database");
    let mut conn = db.new_connection().expect("Failed to create connection");

    assert_eq!(
        conn.get_option_string(OptionConnection::AutoCommit).unwrap(),
        "true"
    );
    let err = conn.commit().unwrap_err();
    assert_eq!(err.status, AdbcStatus::InvalidState);

    conn.set_option(OptionConnection::AutoCommit, OptionValue::String("false".into()))
        .expect("Failed to disable autocommit");
    conn.commit().expect("Commit should succeed in manual mode");
    conn.rollback().expect("Rollback should succeed in manual mode");
}

// ============================================================================
// Metadata Tests
// ============================================================================

#[test]
fn test_driver_manager_get_objects() {
    skip_if_no_library!();

    let mut driver = load_driver();
    let db = driver
        .new_database_with_opts(catalog_options())
        .expect("Failed to create database");
    let conn = db.new_connection().expect("Failed to create connection");

    let reader = conn
        .get_objects(ObjectDepth::All, Some("main"), None, None, None, None)
        .expect("GetObjects should succeed");
    assert_eq!(reader.schema().field(0).name(), "catalog_name");

    let batches = collect(reader);
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, 1);

    let schemas = batches[0].column(1).as_list::<i32>().value(0);
    let tables = schemas.as_struct().column(1).as_list::<i32>().value(0);
    let columns = tables.as_struct().column(2).as_list::<i32>().value(0);
    assert_eq!(columns.len(), 2);
}

#[test]
fn test_driver_manager_get_table_schema() {
    skip_if_no_library!();

    let mut driver = load_driver();
    let db = driver
        .new_database_with_opts(catalog_options())
        .expect("Failed to create database");
    let conn = db.new_connection().expect("Failed to create connection");

    let schema = conn
        .get_table_schema(None, None, "users")
        .expect("GetTableSchema should succeed");
    assert_eq!(schema.fields().len(), 2);
    assert!(!schema.field(0).is_nullable());

    let err = conn.get_table_schema(None, None, "missing").unwrap_err();
    assert_eq!(err.status, AdbcStatus::NotFound);
}

#[test]
fn test_driver_manager_get_info_and_table_types() {
    skip_if_no_library!();

    let mut driver = load_driver();
    let db = driver
        .new_database_with_opts(catalog_options())
        .expect("Failed to create database");
    let conn = db.new_connection().expect("Failed to create connection");

    let info = collect(conn.get_info(None).expect("GetInfo should succeed"));
    assert!(info.iter().map(|b| b.num_rows()).sum::<usize>() >= 3);

    let types = collect(conn.get_table_types().expect("GetTableTypes should succeed"));
    assert_eq!(types[0].column(0).as_string::<i32>().value(0), "TABLE");
}

// ============================================================================
// Statement Tests
// ============================================================================

#[test]
fn test_driver_manager_statement_execution_not_supported() {
    skip_if_no_library!();

    let mut driver = load_driver();
    let db = driver.new_database().expect("Failed to create database");
    let mut conn = db.new_connection().expect("Failed to create connection");
    let mut stmt = conn.new_statement().expect("Failed to create statement");

    stmt.set_sql_query("SELECT 1")
        .expect("Setting SQL text should succeed");
    let err = stmt.execute_update().unwrap_err();
    assert_eq!(err.status, AdbcStatus::NotImplemented);
}
