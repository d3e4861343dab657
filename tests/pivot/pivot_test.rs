//! Tests for the crosstab pivot transform.

use serde_json::json;
use starpath::pivot::{
    pivot, row_from_json, MaterializedPivot, PivotColumns, PivotError, PivotOptions, PivotResult,
    PivotRow, Row,
};
use starpath::Value;

fn rows(json: serde_json::Value) -> Vec<Row> {
    match json {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| row_from_json(item).unwrap())
            .collect(),
        other => panic!("expected an array, got {}", other),
    }
}

fn year_month() -> Vec<Row> {
    rows(json!([
        {"year": 2009, "month": 1, "value": 1},
        {"year": 2009, "month": 3, "value": 2},
        {"year": 2010, "month": 1, "value": 4},
    ]))
}

fn collect(rows: Vec<Row>, keys: &[&str], options: PivotOptions) -> Vec<PivotRow> {
    pivot(rows, keys, options)
        .unwrap()
        .collect::<PivotResult<Vec<_>>>()
        .unwrap()
}

#[test]
fn test_single_key_pivot() {
    let mut stream = pivot(year_month(), &["month"], PivotOptions::default()).unwrap();
    let output: Vec<PivotRow> = stream.by_ref().map(Result::unwrap).collect();

    assert_eq!(output.len(), 2);
    assert_eq!(
        output[0].to_json(),
        json!({"year": 2009, "1": 1, "3": 2})
    );
    assert_eq!(output[1].to_json(), json!({"year": 2010, "1": 4}));

    assert_eq!(
        stream.pivot_columns(),
        PivotColumns::Single(vec![Value::Int(1), Value::Int(3)])
    );
    assert_eq!(stream.other_columns(), ["year".to_string()]);
}

#[test]
fn test_final_block_emitted() {
    let output = collect(
        rows(json!([{"year": 2011, "month": 6, "value": 9}])),
        &["month"],
        PivotOptions::default(),
    );
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].key("year"), Some(&Value::Int(2011)));
    assert_eq!(output[0].cell(&[Value::Int(6)]), Some(&Value::Int(9)));
}

#[test]
fn test_multiple_pivot_keys_nest() {
    let input = rows(json!([
        {"store": "north", "year": 2009, "category": "tools", "value": 10},
        {"store": "north", "year": 2009, "category": "garden", "value": 11},
        {"store": "north", "year": 2010, "category": "tools", "value": 12},
        {"store": "south", "year": 2010, "category": "garden", "value": 13},
    ]));

    let mut stream = pivot(input, &["year", "category"], PivotOptions::default()).unwrap();
    let output: Vec<PivotRow> = stream.by_ref().map(Result::unwrap).collect();

    assert_eq!(output.len(), 2);
    assert_eq!(
        output[0].to_json(),
        json!({
            "store": "north",
            "2009": {"garden": 11, "tools": 10},
            "2010": {"tools": 12},
        })
    );
    assert_eq!(
        output[1].cell(&[Value::Int(2010), Value::from("garden")]),
        Some(&Value::Int(13))
    );
    assert_eq!(
        stream.pivot_columns(),
        PivotColumns::Multiple(vec![
            vec![Value::Int(2009), Value::Int(2010)],
            vec![Value::from("garden"), Value::from("tools")],
        ])
    );
}

#[test]
fn test_custom_value_key() {
    let input = rows(json!([
        {"region": "east", "quarter": 1, "sales.total.sum": 5.5},
        {"region": "east", "quarter": 2, "sales.total.sum": 6.5},
    ]));
    let options = PivotOptions {
        value_key: "sales.total.sum".into(),
        ..PivotOptions::default()
    };

    let output = collect(input, &["quarter"], options);
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].cell(&[Value::Int(2)]), Some(&Value::Float(6.5)));
}

#[test]
fn test_unsorted_input_fragments_by_default() {
    let input = rows(json!([
        {"year": 2009, "month": 1, "value": 1},
        {"year": 2010, "month": 1, "value": 4},
        {"year": 2009, "month": 3, "value": 2},
    ]));

    let output = collect(input, &["month"], PivotOptions::default());
    assert_eq!(output.len(), 3);
    assert_eq!(output[0].key("year"), output[2].key("year"));
}

#[test]
fn test_unsorted_input_fails_when_checked() {
    let input = rows(json!([
        {"year": 2009, "month": 1, "value": 1},
        {"year": 2010, "month": 1, "value": 4},
        {"year": 2009, "month": 3, "value": 2},
    ]));
    let options = PivotOptions {
        check_sorted: true,
        ..PivotOptions::default()
    };

    let results: Vec<_> = pivot(input, &["month"], options).unwrap().collect();
    assert_eq!(results.len(), 3);
    // Both blocks completed before the repeat are still yielded
    assert_eq!(
        results[0].as_ref().unwrap().key("year"),
        Some(&Value::Int(2009))
    );
    assert_eq!(
        results[1].as_ref().unwrap().key("year"),
        Some(&Value::Int(2010))
    );
    assert!(matches!(
        &results[2],
        Err(PivotError::Unsorted { block }) if block == "year=2009"
    ));
}

#[test]
fn test_sorted_input_passes_check() {
    let options = PivotOptions {
        check_sorted: true,
        ..PivotOptions::default()
    };
    assert_eq!(collect(year_month(), &["month"], options).len(), 2);
}

#[test]
fn test_materialized_matches_streaming() {
    let streamed = collect(year_month(), &["month"], PivotOptions::default());
    let materialized =
        MaterializedPivot::new(year_month(), &["month"], PivotOptions::default()).unwrap();

    assert_eq!(materialized.rows(), streamed.as_slice());
    assert_eq!(materialized.len(), 2);
    assert!(!materialized.is_empty());
    assert_eq!(
        materialized.pivot_columns(),
        &PivotColumns::Single(vec![Value::Int(1), Value::Int(3)])
    );
    assert_eq!(materialized.other_columns(), ["year".to_string()]);

    let years: Vec<_> = materialized
        .into_iter()
        .map(|row| row.key("year").cloned())
        .collect();
    assert_eq!(years, vec![Some(Value::Int(2009)), Some(Value::Int(2010))]);
}

#[test]
fn test_materialized_surfaces_errors() {
    let input = rows(json!([
        {"year": 2009, "month": 1, "value": 1},
        {"year": 2010, "month": 1, "value": 4},
        {"year": 2009, "month": 3, "value": 2},
    ]));
    let options = PivotOptions {
        check_sorted: true,
        ..PivotOptions::default()
    };
    assert!(matches!(
        MaterializedPivot::new(input, &["month"], options),
        Err(PivotError::Unsorted { .. })
    ));
}

#[test]
fn test_lazy_consumption() {
    // Rows are pulled only as output is requested
    let mut pulled = 0;
    let source = year_month().into_iter().inspect(|_| pulled += 1);
    let mut stream = pivot(source, &["month"], PivotOptions::default()).unwrap();

    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.key("year"), Some(&Value::Int(2009)));
    drop(stream);
    assert_eq!(pulled, 3);
}
