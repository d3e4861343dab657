//! Pivot over a fully buffered input.

use super::stream::pivot;
use super::{PivotColumns, PivotOptions, PivotResult, PivotRow, Row};

/// Pivot result with all rows and pivot columns computed up front.
///
/// Produces the same rows as the streaming [`pivot`](super::pivot) over the
/// same input, at the cost of holding the whole result in memory.
#[derive(Debug, Clone)]
pub struct MaterializedPivot {
    rows: Vec<PivotRow>,
    pivot_columns: PivotColumns,
    other_columns: Vec<String>,
}

impl MaterializedPivot {
    pub fn new<I>(rows: I, pivot_keys: &[&str], options: PivotOptions) -> PivotResult<Self>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut stream = pivot(rows, pivot_keys, options)?;
        let rows = stream.by_ref().collect::<PivotResult<Vec<_>>>()?;

        Ok(Self {
            rows,
            pivot_columns: stream.pivot_columns(),
            other_columns: stream.other_columns().to_vec(),
        })
    }

    pub fn rows(&self) -> &[PivotRow] {
        &self.rows
    }

    pub fn pivot_columns(&self) -> &PivotColumns {
        &self.pivot_columns
    }

    pub fn other_columns(&self) -> &[String] {
        &self.other_columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for MaterializedPivot {
    type Item = PivotRow;
    type IntoIter = std::vec::IntoIter<PivotRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
