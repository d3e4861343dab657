//! PostgreSQL: ANSI quoting, native booleans and `VAR_SAMP`/`STDDEV_SAMP`.

use super::SqlDialect;

#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }
}
