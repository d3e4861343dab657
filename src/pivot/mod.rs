//! Crosstab reshaping of flat result rows.
//!
//! Rows are grouped into blocks of contiguous rows sharing every key except
//! the value key and the pivot keys. Each block becomes one [`PivotRow`]
//! whose cells are nested by pivot key value:
//!
//! ```text
//! year  month value          year  1   3
//! 2009  1     1        ──►   2009  1   2
//! 2009  3     2              2010  4
//! 2010  1     4
//! ```
//!
//! Input must already be ordered so each block is contiguous (the compiled
//! query's ORDER BY guarantees this). Unchecked mode splits a non-contiguous
//! block into several output rows; checked mode yields every block closed so
//! far and then fails with [`PivotError::Unsorted`].

mod materialized;
mod stream;

pub use materialized::MaterializedPivot;
pub use stream::{pivot, Pivot};

use indexmap::IndexMap;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::PivotSettings;
use crate::value::Value;

/// A flat result row, keyed by column alias in result order.
pub type Row = IndexMap<String, Value>;

/// Errors raised by the pivot transform.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PivotError {
    #[error("At least one pivot key is required")]
    NoPivotKeys,

    #[error("Pivot key {0} is also the value key")]
    PivotOnValueKey(String),

    #[error("Rows are not sorted: block [{block}] reappears after it was closed")]
    Unsorted { block: String },

    #[error("Expected a JSON object row, got {0}")]
    NotAnObject(String),
}

pub type PivotResult<T> = Result<T, PivotError>;

/// Pivot behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotOptions {
    /// Row key holding the cell value.
    pub value_key: String,

    /// Fail on non-contiguous blocks instead of fragmenting them.
    pub check_sorted: bool,
}

impl Default for PivotOptions {
    fn default() -> Self {
        Self::from(&PivotSettings::default())
    }
}

impl From<&PivotSettings> for PivotOptions {
    fn from(settings: &PivotSettings) -> Self {
        Self {
            value_key: settings.value_key.clone(),
            check_sorted: settings.check_sorted,
        }
    }
}

/// A pivoted cell: a leaf value, or the next pivot key level.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    Nested(BTreeMap<Value, Cell>),
}

impl Cell {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Value(value) => value.into(),
            Cell::Nested(cells) => cells_to_json(cells),
        }
    }
}

/// One output row: the block's identifying keys plus its nested cells.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub keys: Row,
    pub cells: BTreeMap<Value, Cell>,
}

impl PivotRow {
    pub fn key(&self, name: &str) -> Option<&Value> {
        self.keys.get(name)
    }

    /// The leaf at `path`, one value per pivot key.
    pub fn cell(&self, path: &[Value]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut cells = &self.cells;
        for step in parents {
            match cells.get(step)? {
                Cell::Nested(children) => cells = children,
                Cell::Value(_) => return None,
            }
        }
        match cells.get(last)? {
            Cell::Value(value) => Some(value),
            Cell::Nested(_) => None,
        }
    }

    /// Keys and cells merged into one JSON object, pivot values as keys.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (key, value) in &self.keys {
            object.insert(key.clone(), value.into());
        }
        if let serde_json::Value::Object(cells) = cells_to_json(&self.cells) {
            object.extend(cells);
        }
        serde_json::Value::Object(object)
    }
}

fn cells_to_json(cells: &BTreeMap<Value, Cell>) -> serde_json::Value {
    serde_json::Value::Object(
        cells
            .iter()
            .map(|(key, cell)| (key.to_string(), cell.to_json()))
            .collect(),
    )
}

/// Distinct observed pivot values, sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub enum PivotColumns {
    /// One pivot key
    Single(Vec<Value>),
    /// One list per pivot key, in pivot key order
    Multiple(Vec<Vec<Value>>),
}

/// Build a [`Row`] from a JSON object, keeping its key order.
pub fn row_from_json(json: serde_json::Value) -> PivotResult<Row> {
    match json {
        serde_json::Value::Object(object) => Ok(object
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect()),
        other => Err(PivotError::NotAnObject(other.to_string())),
    }
}
