//! Single-pass pivot over any row iterator.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::trace;

use super::{Cell, PivotColumns, PivotError, PivotOptions, PivotResult, PivotRow, Row};
use crate::value::Value;

/// Pivot `rows` on `pivot_keys`.
///
/// Rows are pulled lazily; nothing beyond the current block is buffered.
pub fn pivot<I>(
    rows: I,
    pivot_keys: &[&str],
    options: PivotOptions,
) -> PivotResult<Pivot<I::IntoIter>>
where
    I: IntoIterator<Item = Row>,
{
    if pivot_keys.is_empty() {
        return Err(PivotError::NoPivotKeys);
    }
    if let Some(key) = pivot_keys.iter().find(|k| **k == options.value_key) {
        return Err(PivotError::PivotOnValueKey(key.to_string()));
    }

    Ok(Pivot {
        rows: rows.into_iter(),
        pivot_keys: pivot_keys.iter().map(|k| k.to_string()).collect(),
        options,
        other_columns: None,
        observed: vec![BTreeSet::new(); pivot_keys.len()],
        current: None,
        closed: HashSet::new(),
        pending: None,
        finished: false,
    })
}

/// Rows sharing identifying values, being merged.
#[derive(Debug)]
struct Block {
    identity: Vec<Value>,
    keys: Row,
    cells: BTreeMap<Value, Cell>,
}

impl Block {
    fn into_row(self) -> PivotRow {
        PivotRow {
            keys: self.keys,
            cells: self.cells,
        }
    }
}

/// Streaming pivot. Yields one [`PivotRow`] per contiguous block.
#[derive(Debug)]
pub struct Pivot<I> {
    rows: I,
    pivot_keys: Vec<String>,
    options: PivotOptions,
    /// Identifying keys, taken from the first row
    other_columns: Option<Vec<String>>,
    /// Distinct values seen so far, per pivot key
    observed: Vec<BTreeSet<Value>>,
    current: Option<Block>,
    /// Identities of emitted blocks; only tracked in checked mode
    closed: HashSet<Vec<Value>>,
    /// Error held back until the block closed before it has been yielded
    pending: Option<PivotError>,
    finished: bool,
}

impl<I> Pivot<I> {
    /// Distinct pivot values observed so far. Complete once the iterator is exhausted.
    pub fn pivot_columns(&self) -> PivotColumns {
        let mut columns: Vec<Vec<Value>> = self
            .observed
            .iter()
            .map(|values| values.iter().cloned().collect())
            .collect();
        if columns.len() == 1 {
            PivotColumns::Single(columns.remove(0))
        } else {
            PivotColumns::Multiple(columns)
        }
    }

    /// Keys other than the value key and the pivot keys. Empty until a row has been read.
    pub fn other_columns(&self) -> &[String] {
        self.other_columns.as_deref().unwrap_or_default()
    }

    fn identifying_columns(&mut self, row: &Row) -> Vec<String> {
        let pivot_keys = &self.pivot_keys;
        let value_key = &self.options.value_key;
        self.other_columns
            .get_or_insert_with(|| {
                row.keys()
                    .filter(|k| *k != value_key && !pivot_keys.contains(k))
                    .cloned()
                    .collect()
            })
            .clone()
    }

    fn open(&mut self, identity: Vec<Value>, columns: &[String]) -> PivotResult<()> {
        if self.options.check_sorted && self.closed.contains(&identity) {
            return Err(PivotError::Unsorted {
                block: describe(columns, &identity),
            });
        }
        self.current = Some(Block {
            keys: columns.iter().cloned().zip(identity.iter().cloned()).collect(),
            identity,
            cells: BTreeMap::new(),
        });
        Ok(())
    }

    fn close(&mut self) -> Option<PivotRow> {
        let block = self.current.take()?;
        trace!(cells = block.cells.len(), "emitting pivot block");
        if self.options.check_sorted {
            self.closed.insert(block.identity.clone());
        }
        Some(block.into_row())
    }
}

impl<I: Iterator<Item = Row>> Iterator for Pivot<I> {
    type Item = PivotResult<PivotRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            self.finished = true;
            return Some(Err(err));
        }
        if self.finished {
            return None;
        }

        while let Some(row) = self.rows.next() {
            let columns = self.identifying_columns(&row);
            let identity: Vec<Value> = columns.iter().map(|k| lookup(&row, k)).collect();
            let path: Vec<Value> = self.pivot_keys.iter().map(|k| lookup(&row, k)).collect();
            let value = lookup(&row, &self.options.value_key);

            for (observed, key) in self.observed.iter_mut().zip(&path) {
                observed.insert(key.clone());
            }

            let same_block = self
                .current
                .as_ref()
                .is_some_and(|block| block.identity == identity);

            let emitted = if same_block {
                None
            } else {
                let emitted = self.close();
                if let Err(err) = self.open(identity, &columns) {
                    return match emitted {
                        Some(row) => {
                            self.pending = Some(err);
                            Some(Ok(row))
                        }
                        None => {
                            self.finished = true;
                            Some(Err(err))
                        }
                    };
                }
                emitted
            };

            if let Some(block) = self.current.as_mut() {
                merge(&mut block.cells, &path, value);
            }

            if let Some(row) = emitted {
                return Some(Ok(row));
            }
        }

        self.finished = true;
        self.close().map(Ok)
    }
}

/// A missing key reads as null.
fn lookup(row: &Row, key: &str) -> Value {
    row.get(key).cloned().unwrap_or(Value::Null)
}

/// Insert `value` at `path`, creating intermediate levels as needed.
fn merge(cells: &mut BTreeMap<Value, Cell>, path: &[Value], value: Value) {
    match path {
        [] => {}
        [leaf] => {
            cells.insert(leaf.clone(), Cell::Value(value));
        }
        [head, tail @ ..] => {
            let entry = cells
                .entry(head.clone())
                .or_insert_with(|| Cell::Nested(BTreeMap::new()));
            if let Cell::Value(_) = entry {
                *entry = Cell::Nested(BTreeMap::new());
            }
            if let Cell::Nested(children) = entry {
                merge(children, tail, value);
            }
        }
    }
}

fn describe(columns: &[String], identity: &[Value]) -> String {
    columns
        .iter()
        .zip(identity)
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
