//! SQL rendering.
//!
//! Compiled plans are written as tokens and serialized per database:
//!
//! - [`expr`] - Expression AST and builder functions
//! - [`query`] - SELECT clauses (items, tables, joins, ordering)
//! - [`token`] - Tokens and the token stream
//! - [`dialect`] - Per-database quoting, literals and pagination

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    case_when, count, count_distinct, func, lit_bool, lit_float, lit_int, lit_null, lit_str, max,
    sum, table_col, BinaryOperator, Expr, ExprExt, Literal,
};
pub use query::{Join, OrderTerm, SelectItem, SortDir, TableRef};
pub use token::{Keyword, Token, TokenStream};
