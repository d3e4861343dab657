//! Tests for loading settings and feeding them to the compiler and pivot.

#[path = "../common/mod.rs"]
mod common;

use std::fs;

use starpath::compile::CompileOptions;
use starpath::config::{Settings, SettingsError};
use starpath::pivot::PivotOptions;
use starpath::query::{CompileError, QueryBuilder};
use starpath::sql::expr::{table_col, ExprExt};
use starpath::sql::Dialect;

#[test]
fn test_partial_file_keeps_defaults() {
    let settings = Settings::from_toml(
        r#"
        [compiler]
        dialect = "tsql"
        "#,
    )
    .unwrap();

    assert_eq!(settings.compiler.dialect().unwrap(), Dialect::TSql);
    assert_eq!(settings.compiler.max_pivot_span, 500);
    assert_eq!(settings.pivot.value_key, "value");
}

#[test]
fn test_full_file() {
    let settings = Settings::from_toml(
        r#"
        [compiler]
        dialect = "duckdb"
        max_pivot_span = 12
        surrogate_key = "sk"

        [pivot]
        value_key = "amount"
        check_sorted = true
        "#,
    )
    .unwrap();

    assert_eq!(settings.compiler.dialect().unwrap(), Dialect::DuckDb);
    assert_eq!(settings.compiler.max_pivot_span, 12);
    assert_eq!(settings.compiler.surrogate_key, "sk");

    let options = PivotOptions::from(&settings.pivot);
    assert_eq!(options.value_key, "amount");
    assert!(options.check_sorted);
}

#[test]
fn test_dialect_from_environment() {
    std::env::set_var("STARPATH_SETTINGS_TEST_DIALECT", "mysql");
    let settings = Settings::from_toml(
        r#"
        [compiler]
        dialect = "${STARPATH_SETTINGS_TEST_DIALECT}"
        "#,
    )
    .unwrap();

    let options = CompileOptions::from_settings(&settings).unwrap();
    assert_eq!(options.dialect, Dialect::MySql);
    std::env::remove_var("STARPATH_SETTINGS_TEST_DIALECT");
}

#[test]
fn test_invalid_settings() {
    assert!(matches!(
        Settings::from_toml("[compiler]\nsurrogate_key = \"  \"\n"),
        Err(SettingsError::InvalidConfig(_))
    ));
    assert!(matches!(
        Settings::from_toml("[pivot]\nvalue_key = \"\"\n"),
        Err(SettingsError::InvalidConfig(_))
    ));
    assert!(matches!(
        Settings::from_toml("[compiler]\nmax_pivot_span = \"many\"\n"),
        Err(SettingsError::ParseError(_))
    ));
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join("starpath_settings_test.toml");
    fs::write(&path, "[compiler]\nsurrogate_key = \"store_sk\"\n").unwrap();

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.compiler.surrogate_key, "store_sk");
    fs::remove_file(&path).unwrap();

    assert!(matches!(
        Settings::from_file(&path),
        Err(SettingsError::FileNotFound(_))
    ));
}

#[test]
fn test_compiler_settings_reach_the_builder() {
    let settings = Settings::from_toml(
        r#"
        [compiler]
        max_pivot_span = 2
        surrogate_key = "sk"
        "#,
    )
    .unwrap();
    let schema = common::star_schema();

    let mut builder = QueryBuilder::new(&schema, "sales")
        .unwrap()
        .with_settings(settings.compiler.clone());
    builder.select(&["store", "count.product"]).unwrap();
    let plan = builder.plan().unwrap();

    assert_eq!(
        plan.joins[0].on,
        table_col("store", "sk").eq(table_col("sales", "store_dimension_id"))
    );
    assert_eq!(plan.group_by[0], table_col("store", "sk"));

    // Quarter spans four values, over the configured limit
    let err = builder
        .select(&["sum.sales.total~order_date.quarter"])
        .unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedPivotDomain { .. }));
}
