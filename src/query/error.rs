//! Errors raised while compiling references into a query plan.

use thiserror::Error;

use crate::schema::SchemaError;

/// Result type for query compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Typed failures surfaced to the caller. The compiler never swallows them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    /// First path segment is neither the base table nor a known fact or dimension.
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    /// Path segment does not name a column of the resolved table.
    #[error("Unknown column {column} on {table}")]
    UnknownColumn { table: String, column: String },

    /// The pivot column's value domain cannot be enumerated.
    #[error("Cannot pivot on {column}: {reason}")]
    UnsupportedPivotDomain { column: String, reason: String },

    /// Aggregation operator applied to a column it does not suit.
    #[error("Cannot apply {op} to {column}: {reason}")]
    AmbiguousAggregation {
        op: String,
        column: String,
        reason: String,
    },

    /// Malformed reference string.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Malformed filter predicate.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Column owned by a table that cannot be joined to the base table.
    #[error("Table {table} cannot be joined to {base}")]
    UnrelatedTable { table: String, base: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
