//! Tests for schema registration and entity lookup.

#[path = "../common/mod.rs"]
mod common;

use starpath::schema::{
    AbstractType, ColumnLike, Dimension, DimensionReference, Fact, FactColumn, Schema,
    SchemaColumn, SchemaEntity, SchemaError,
};

#[test]
fn test_star_schema_registers() {
    let schema = common::star_schema();

    let facts: Vec<_> = schema.facts().map(|f| f.name().to_string()).collect();
    assert_eq!(facts, vec!["sales"]);

    let dimensions: Vec<_> = schema.dimensions().map(|d| d.name().to_string()).collect();
    assert_eq!(dimensions, vec!["product", "date", "store"]);
}

#[test]
fn test_identifiable_dimension() {
    let schema = common::star_schema();
    let product = schema.dimension("product").unwrap();

    assert!(product.is_identifiable());
    assert_eq!(product.original_key(), Some("original_id"));
    assert_eq!(product.main_identifier(), Some("name"));
    assert!(product.is_identifier("code"));
    assert!(!product.is_identifier("category"));

    // The original key is declared as an internal column
    let key = product.get_column("original_id").unwrap();
    assert!(key.is_internal());
    assert!(!key.nullable());
}

#[test]
fn test_store_is_not_identifiable() {
    let schema = common::star_schema();
    let store = schema.dimension("store").unwrap();
    assert!(!store.is_identifiable());
    assert!(store.get_column("original_id").is_none());
}

#[test]
fn test_fact_columns_in_order() {
    let schema = common::star_schema();
    let sales = schema.fact("sales").unwrap();

    let names: Vec<_> = sales.columns().map(|c| c.name().to_string()).collect();
    assert_eq!(
        names,
        vec![
            "product",
            "order_date",
            "ship_date",
            "store",
            "order_ref",
            "is_return",
            "total",
            "cost",
            "quantity",
            "balance",
            "margin",
            "net",
        ]
    );

    assert!(matches!(
        sales.get_column("order_date"),
        Some(FactColumn::Dimension(_))
    ));
    assert!(matches!(
        sales.get_column("order_ref"),
        Some(FactColumn::Degenerate(_))
    ));
    assert!(matches!(
        sales.get_column("total"),
        Some(FactColumn::Measure(_))
    ));
    assert!(!sales.is_factless());
}

#[test]
fn test_role_played_references() {
    let schema = common::star_schema();
    let sales = schema.fact("sales").unwrap();

    let order_date = sales.dimension_reference("order_date").unwrap();
    assert!(order_date.is_role_played());
    assert_eq!(order_date.dimension().name(), "date");
    assert_eq!(order_date.foreign_key(), "order_date_dimension_id");
    assert_eq!(order_date.label(), "Order Date");

    let product = sales.dimension_reference("product").unwrap();
    assert!(!product.is_role_played());
    assert_eq!(product.label(), "Product");
}

#[test]
fn test_foreign_key_override() {
    let mut schema = Schema::new();
    let store = schema.add_dimension(common::store()).unwrap();
    let sales = schema
        .add_fact(
            Fact::new("sales")
                .reference(DimensionReference::new(&store).with_foreign_key("store_key")),
        )
        .unwrap();

    assert_eq!(
        sales.dimension_reference("store").unwrap().foreign_key(),
        "store_key"
    );
}

#[test]
fn test_entity_lookup() {
    let schema = common::star_schema();

    assert!(matches!(schema.entity("sales"), Some(SchemaEntity::Fact(_))));
    assert!(matches!(
        schema.entity("product"),
        Some(SchemaEntity::Dimension(_))
    ));
    // Role aliases only resolve relative to their fact
    assert!(schema.entity("order_date").is_none());
    assert!(schema.entity("missing").is_none());
}

#[test]
fn test_dimension_type_follows_main_identifier() {
    let schema = common::star_schema();
    assert_eq!(
        schema.dimension("product").unwrap().abstract_type(),
        AbstractType::String
    );
    assert_eq!(
        schema.dimension("date").unwrap().abstract_type(),
        AbstractType::Date
    );
}

#[test]
fn test_duplicate_column_rejected() {
    let mut schema = Schema::new();
    let err = schema
        .add_dimension(
            Dimension::new("store")
                .column(SchemaColumn::new("name", AbstractType::String))
                .column(SchemaColumn::new("name", AbstractType::Text)),
        )
        .unwrap_err();

    assert_eq!(
        err,
        SchemaError::DuplicateColumn {
            table: "store".into(),
            column: "name".into(),
        }
    );
}

#[test]
fn test_hierarchy_must_name_columns() {
    let mut schema = Schema::new();
    let err = schema
        .add_dimension(
            Dimension::new("store")
                .column(SchemaColumn::new("city", AbstractType::String))
                .implies("city", &["country"]),
        )
        .unwrap_err();

    assert_eq!(
        err,
        SchemaError::UnknownHierarchyColumn {
            table: "store".into(),
            column: "country".into(),
        }
    );
}

#[test]
fn test_fact_table_name_clashes_with_dimension() {
    let mut schema = Schema::new();
    let product = schema.add_dimension(common::product()).unwrap();
    let err = schema
        .add_fact(Fact::new("product").dimension(&product))
        .unwrap_err();
    assert_eq!(err, SchemaError::DuplicateTable("product".into()));

    // Nothing registered by the failed call
    assert!(schema.fact("product").is_none());
}
