//! Database dialects.
//!
//! Compiled queries differ between databases only in a few places:
//!
//! - Identifier quoting: `"` (PostgreSQL, DuckDB), `` ` `` (MySQL), `[]` (T-SQL)
//! - Boolean literals: `true`/`false` or `1`/`0`
//! - Row limits: `LIMIT n` or `OFFSET 0 ROWS FETCH NEXT n ROWS ONLY`
//! - Sample statistics: `VAR_SAMP`/`STDDEV_SAMP` or `VAR`/`STDEV`
//!
//! ```ignore
//! use starpath::sql::{Dialect, SqlDialect};
//!
//! assert_eq!(Dialect::TSql.quote_identifier("product"), "[product]");
//! ```

mod duckdb;
mod mysql;
mod postgres;
mod tsql;

pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use tsql::TSql;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How one database spells the parts of a query that vary.
///
/// Defaults follow ANSI SQL.
pub trait SqlDialect: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quote.
    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    /// Quote an identifier, doubling any closing quote inside it.
    fn quote_identifier(&self, ident: &str) -> String {
        let (open, close) = self.identifier_quotes();
        let escaped = ident.replace(close, &close.to_string().repeat(2));
        format!("{}{}{}", open, escaped, close)
    }

    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    fn format_bool(&self, b: bool) -> &'static str {
        if b {
            "true"
        } else {
            "false"
        }
    }

    /// Row limit clause. `ordered` is whether the query has an ORDER BY.
    fn limit_clause(&self, rows: u64, _ordered: bool) -> String {
        format!("LIMIT {}", rows)
    }

    /// Dialect spelling of a function, if it differs.
    fn remap_function(&self, _name: &str) -> Option<&'static str> {
        None
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    DuckDb,
    Postgres,
    MySql,
    TSql,
}

impl Dialect {
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::DuckDb => &DuckDb,
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
            Dialect::TSql => &TSql,
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duckdb" => Ok(Dialect::DuckDb),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "tsql" | "mssql" | "sqlserver" => Ok(Dialect::TSql),
            other => Err(other.to_string()),
        }
    }
}

impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn identifier_quotes(&self) -> (char, char) {
        self.dialect().identifier_quotes()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn limit_clause(&self, rows: u64, ordered: bool) -> String {
        self.dialect().limit_clause(rows, ordered)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }
}
