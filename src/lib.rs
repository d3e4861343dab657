//! # Starpath
//!
//! Compiles dotted column references over a star schema into SQL, and
//! reshapes flat results into crosstabs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Schema (facts, dimensions)                  │
//! │  (columns, identifiers, hierarchies, role-played refs)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [ReferenceParser]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    QueryColumn                           │
//! │  (qualified, dimension, aggregate, pivoted columns)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [QueryBuilder]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     QueryPlan                            │
//! │  (joins, WHERE/HAVING routing, minimal GROUP BY)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Dialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    SQL Query                             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [pivot] (result rows)
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Crosstab rows                            │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod compile;
pub mod config;
pub mod pivot;
pub mod query;
pub mod schema;
pub mod sql;
pub mod value;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile_request, CompileOptions, CompileOutput, QueryRequest};
    pub use crate::config::{CompilerSettings, PivotSettings, Settings};
    pub use crate::pivot::{pivot, MaterializedPivot, PivotOptions, PivotRow, Row};
    pub use crate::query::{
        AggregateOp, CompileError, CompileResult, Label, QueryBuilder, QueryColumn, QueryPlan,
        ReferenceParser,
    };
    pub use crate::schema::{
        AbstractType, Dimension, DimensionReference, Fact, Schema, SchemaColumn, SchemaEntity,
    };
    pub use crate::sql::{Dialect, SqlDialect};
    pub use crate::value::Value;
}

// Also export at crate root for convenience
pub use compile::{compile_request, CompileOptions, QueryRequest};
pub use query::{CompileError, QueryBuilder, QueryPlan};
pub use schema::Schema;
pub use sql::Dialect;
pub use value::Value;
