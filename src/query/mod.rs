//! Reference compilation: dotted paths in, query plans out.
//!
//! ```text
//! "sum.sales.total~product.category"
//!         │
//!         ▼
//!  ReferenceParser ──► QueryColumn(s) ──► QueryBuilder ──► QueryPlan ──► SQL
//!         ▲                                   │
//!       Schema                          HierarchyGraph
//!                                    (group by minimization)
//! ```

pub mod aggregate;
pub mod builder;
pub mod column;
pub mod error;
pub mod parser;
pub mod plan;

pub use aggregate::AggregateOp;
pub use builder::QueryBuilder;
pub use column::{Label, QueryColumn};
pub use error::{CompileError, CompileResult};
pub use parser::ReferenceParser;
pub use plan::QueryPlan;
