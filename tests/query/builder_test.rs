//! Tests for QueryBuilder: joins, filter routing, ordering and limits.

#[path = "../common/mod.rs"]
mod common;

use common::star_schema;
use starpath::query::{CompileError, QueryBuilder};
use starpath::sql::expr::{lit_float, lit_int, lit_str, sum, table_col, ExprExt};
use starpath::sql::{Dialect, SortDir};

// ============================================================================
// Joins
// ============================================================================

#[test]
fn test_dimension_joined_once() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["product.code", "product.code"])
        .unwrap()
        .select(&["product.code", "product.manufacturer"])
        .unwrap();

    let plan = builder.plan().unwrap();
    assert_eq!(plan.aliases(), vec!["product.code", "product.manufacturer"]);
    assert_eq!(plan.joins.len(), 1);
    assert_eq!(plan.joins[0].table.reference_name(), "product");
    assert_eq!(
        plan.joins[0].on,
        table_col("product", "id").eq(table_col("sales", "product_dimension_id"))
    );
}

#[test]
fn test_role_played_dimensions_join_separately() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["order_date.year", "ship_date.year", "sum.sales.total"])
        .unwrap();

    let plan = builder.plan().unwrap();
    let joined: Vec<&str> = plan
        .joins
        .iter()
        .map(|j| j.table.reference_name())
        .collect();
    assert_eq!(joined, vec!["order_date", "ship_date"]);
    assert!(plan.joins.iter().all(|j| j.table.table == "date"));
    assert_eq!(
        plan.joins[1].on,
        table_col("ship_date", "id").eq(table_col("sales", "ship_date_dimension_id"))
    );
}

#[test]
fn test_base_table_never_joined() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder.select(&["sales.order_ref", "sales.total"]).unwrap();

    let plan = builder.plan().unwrap();
    assert!(plan.joins.is_empty());
}

#[test]
fn test_pivot_joins_both_owners() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["store", "sum.sales.total~product.category"])
        .unwrap();

    let plan = builder.plan().unwrap();
    let joined: Vec<&str> = plan
        .joins
        .iter()
        .map(|j| j.table.reference_name())
        .collect();
    assert_eq!(joined, vec!["store", "product"]);
    assert_eq!(plan.select.len(), 4);
}

#[test]
fn test_dimension_base_has_no_joins() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "product").unwrap();
    builder
        .select(&["product.manufacturer", "count.product"])
        .unwrap();

    let plan = builder.plan().unwrap();
    assert!(plan.joins.is_empty());
    assert_eq!(plan.from.reference_name(), "product");
}

#[test]
fn test_unrelated_table() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "product").unwrap();
    let err = builder.select(&["store.name"]).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnrelatedTable {
            table: "store".into(),
            base: "product".into(),
        }
    );
}

#[test]
fn test_unknown_base() {
    let schema = star_schema();
    let err = QueryBuilder::new(&schema, "returns").unwrap_err();
    assert_eq!(err, CompileError::UnknownDimension("returns".into()));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_plain_filter_goes_to_where() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["sum.sales.total"])
        .unwrap()
        .filter(&["product.category:tools"])
        .unwrap();

    let plan = builder.plan().unwrap();
    assert_eq!(
        plan.where_clause,
        Some(table_col("product", "category").eq(lit_str("tools")))
    );
    assert!(plan.having.is_none());
    // The filter alone pulls in the join
    assert_eq!(plan.joins.len(), 1);
}

#[test]
fn test_multi_value_filter_uses_in() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["product"])
        .unwrap()
        .filter(&["order_date.year:2009,2010", "product.category:tools"])
        .unwrap();

    let plan = builder.plan().unwrap();
    let expected = table_col("order_date", "year")
        .in_list(vec![lit_int(2009), lit_int(2010)])
        .and(table_col("product", "category").eq(lit_str("tools")));
    assert_eq!(plan.where_clause, Some(expected));
}

#[test]
fn test_aggregate_filter_goes_to_having() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["product"])
        .unwrap()
        .filter(&["sum.sales.total:100"])
        .unwrap();

    let plan = builder.plan().unwrap();
    assert!(plan.where_clause.is_none());
    assert_eq!(
        plan.having,
        Some(sum(table_col("sales", "total")).eq(lit_float(100.0)))
    );
    // HAVING alone makes the query grouped
    assert!(!plan.group_by.is_empty());
}

#[test]
fn test_calculated_aggregate_filter_goes_to_having() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["store", "sales.margin"])
        .unwrap()
        .filter(&["sales.margin:0"])
        .unwrap();

    let plan = builder.plan().unwrap();
    assert!(plan.where_clause.is_none());
    assert!(plan.having.is_some());
}

#[test]
fn test_invalid_filters() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();

    for predicate in [
        "product.category",
        "order_date.year:soon",
        "sales.is_return:maybe",
        "product.category:",
        "sales.total~product.category:1",
    ] {
        let err = builder.filter(&[predicate]).unwrap_err();
        assert!(
            matches!(err, CompileError::InvalidFilter(_)),
            "{} gave {:?}",
            predicate,
            err
        );
    }
}

#[test]
fn test_filter_on_unknown_column() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    let err = builder.filter(&["store.country:NZ"]).unwrap_err();
    assert!(matches!(err, CompileError::UnknownColumn { .. }));
}

// ============================================================================
// Ordering and limits
// ============================================================================

#[test]
fn test_order_uses_selected_expression() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["product", "sum.sales.total"])
        .unwrap()
        .order(&["-sum.sales.total", "product"])
        .unwrap();

    let plan = builder.plan().unwrap();
    assert_eq!(plan.order_by.len(), 2);
    assert_eq!(plan.order_by[0].expr, sum(table_col("sales", "total")));
    assert_eq!(plan.order_by[0].dir, SortDir::Desc);
    // Dimensions sort on their display identifier
    assert_eq!(plan.order_by[1].expr, table_col("product", "name"));
    assert_eq!(plan.order_by[1].dir, SortDir::Asc);
}

#[test]
fn test_order_on_unselected_column() {
    let schema = star_schema();

    let mut plain = QueryBuilder::new(&schema, "sales").unwrap();
    plain
        .select(&["sales.net"])
        .unwrap()
        .order(&["order_date.day"])
        .unwrap();
    assert!(plain.plan().is_ok());

    let mut grouped = QueryBuilder::new(&schema, "sales").unwrap();
    grouped
        .select(&["sum.sales.total"])
        .unwrap()
        .order(&["order_date.day"])
        .unwrap();
    assert!(matches!(
        grouped.plan(),
        Err(CompileError::InvalidReference(_))
    ));
}

#[test]
fn test_aggregate_order_groups_the_query() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["product.category"])
        .unwrap()
        .order(&["-sum.sales.total"])
        .unwrap();

    let plan = builder.plan().unwrap();
    assert_eq!(plan.group_by, vec![table_col("product", "category")]);
    assert_eq!(plan.order_by[0].expr, sum(table_col("sales", "total")));
    assert!(plan
        .to_sql(Dialect::Postgres)
        .contains("GROUP BY \"product\".\"category\"\nORDER BY SUM(\"sales\".\"total\") DESC"));
}

#[test]
fn test_aggregate_order_without_grouped_columns() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder
        .select(&["sales.net"])
        .unwrap()
        .order(&["-sum.sales.total"])
        .unwrap();

    let err = builder.plan().unwrap_err();
    assert!(
        matches!(&err, CompileError::InvalidReference(msg) if msg.contains("sales.net")),
        "{:?}",
        err
    );
}

#[test]
fn test_loose_columns_rejected_in_grouped_query() {
    let schema = star_schema();

    // Row-level calculation next to a grouped attribute
    let mut calculated = QueryBuilder::new(&schema, "sales").unwrap();
    calculated.select(&["store", "sales.net"]).unwrap();
    assert!(matches!(
        calculated.plan(),
        Err(CompileError::InvalidReference(_))
    ));

    // Unaggregated pivot cells next to an aggregate
    let mut pivoted = QueryBuilder::new(&schema, "sales").unwrap();
    pivoted
        .select(&["sum.sales.quantity", "sales.total~sales.is_return"])
        .unwrap();
    assert!(matches!(
        pivoted.plan(),
        Err(CompileError::InvalidReference(_))
    ));

    // Aggregating them makes the query valid
    let mut aggregated = QueryBuilder::new(&schema, "sales").unwrap();
    aggregated
        .select(&["store", "sum.sales.net", "sum.sales.total~sales.is_return"])
        .unwrap();
    let plan = aggregated.plan().unwrap();
    assert_eq!(plan.select.len(), 4);
    assert_eq!(
        plan.group_by,
        vec![table_col("store", "id"), table_col("store", "name")]
    );
}

#[test]
fn test_limit() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder.select(&["sales.total"]).unwrap();
    builder.limit(25);

    let plan = builder.plan().unwrap();
    assert_eq!(plan.limit, Some(25));
    assert!(plan.to_sql(Dialect::Postgres).ends_with("\nLIMIT 25"));
}

#[test]
fn test_empty_selection() {
    let schema = star_schema();
    let builder = QueryBuilder::new(&schema, "sales").unwrap();
    assert!(matches!(
        builder.plan(),
        Err(CompileError::InvalidReference(_))
    ));
}

#[test]
fn test_columns_accumulate_across_calls() {
    let schema = star_schema();
    let mut builder = QueryBuilder::new(&schema, "sales").unwrap();
    builder.select(&["product"]).unwrap();
    builder.select(&["store", "product"]).unwrap();

    let aliases: Vec<String> = builder.columns().iter().map(|c| c.alias()).collect();
    assert_eq!(aliases, vec!["product", "store"]);
    assert_eq!(builder.base().alias(), "sales");
}
