//! T-SQL (SQL Server, Azure SQL).
//!
//! - `[name]` quoting and `N'...'` for non-ASCII strings
//! - Bit booleans
//! - `OFFSET .. FETCH` row limits, which are only valid after an ORDER BY
//! - `VAR` and `STDEV` for sample variance and standard deviation

use super::SqlDialect;

#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn quote_string(&self, s: &str) -> String {
        let prefix = if s.is_ascii() { "" } else { "N" };
        format!("{}'{}'", prefix, s.replace('\'', "''"))
    }

    fn format_bool(&self, b: bool) -> &'static str {
        if b {
            "1"
        } else {
            "0"
        }
    }

    fn limit_clause(&self, rows: u64, ordered: bool) -> String {
        let fetch = format!("OFFSET 0 ROWS FETCH NEXT {} ROWS ONLY", rows);
        if ordered {
            fetch
        } else {
            format!("ORDER BY (SELECT NULL)\n{}", fetch)
        }
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        match name.to_uppercase().as_str() {
            "VAR_SAMP" => Some("VAR"),
            "STDDEV_SAMP" => Some("STDEV"),
            _ => None,
        }
    }
}
