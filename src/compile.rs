//! End-to-end compilation from a query request to SQL.
//!
//! This module provides the high-level API over [`QueryBuilder`]:
//!
//! ```text
//! QueryRequest → resolve references → QueryPlan → SQL
//! ```
//!
//! # Example
//!
//! ```ignore
//! use starpath::compile::{compile_request, CompileOptions, QueryRequest};
//! use starpath::sql::Dialect;
//!
//! let request: QueryRequest = serde_json::from_str(r#"{
//!     "from": "sales",
//!     "select": ["product", "sum.sales.total"],
//!     "filter": ["product.category:tools,garden"],
//!     "order": ["-sum.sales.total"],
//!     "limit": 10
//! }"#)?;
//!
//! let options = CompileOptions::default().with_dialect(Dialect::Postgres);
//! let output = compile_request(&schema, &request, &options)?;
//! println!("{}", output.sql);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{CompilerSettings, Settings, SettingsError};
use crate::query::{CompileResult, QueryBuilder, QueryPlan};
use crate::schema::Schema;
use crate::sql::Dialect;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,

    /// Reference resolution settings.
    pub compiler: CompilerSettings,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            compiler: CompilerSettings::default(),
        }
    }
}

impl CompileOptions {
    /// Take the dialect and compiler settings from loaded settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self {
            dialect: settings.compiler.dialect()?,
            compiler: settings.compiler.clone(),
        })
    }

    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

// ============================================================================
// Request / Output
// ============================================================================

/// A query described entirely by reference strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryRequest {
    /// Base fact or dimension.
    pub from: String,
    pub select: Vec<String>,
    /// `reference:value[,value...]` predicates.
    pub filter: Vec<String>,
    /// References, `-` prefixed for descending order.
    pub order: Vec<String>,
    pub limit: Option<u64>,
}

/// Result of compiling a request to SQL.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The generated SQL string.
    pub sql: String,

    /// The plan the SQL was rendered from (columns, labels, AST pieces).
    pub plan: QueryPlan,

    /// The dialect used for generation.
    pub dialect: Dialect,
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile a request against `schema`.
pub fn compile_request(
    schema: &Schema,
    request: &QueryRequest,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    let mut builder =
        QueryBuilder::new(schema, &request.from)?.with_settings(options.compiler.clone());

    builder
        .select(&as_strs(&request.select))?
        .filter(&as_strs(&request.filter))?
        .order(&as_strs(&request.order))?;
    if let Some(limit) = request.limit {
        builder.limit(limit);
    }

    let plan = builder.plan()?;
    let sql = plan.to_sql(options.dialect);

    Ok(CompileOutput {
        sql,
        plan,
        dialect: options.dialect,
    })
}

fn as_strs(items: &[String]) -> Vec<&str> {
    items.iter().map(String::as_str).collect()
}
