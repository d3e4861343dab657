//! Compiled query plans.

use super::column::{Label, QueryColumn};
use crate::sql::dialect::Dialect;
use crate::sql::expr::Expr;
use crate::sql::query::{Join, OrderTerm, SelectItem, TableRef};
use crate::sql::token::{Keyword, Token, TokenStream};

/// The abstract description of a compiled query.
///
/// Execution is left to the caller; [`QueryPlan::to_sql`] renders it for a
/// dialect.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub from: TableRef,
    pub select: Vec<SelectItem>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderTerm>,
    pub limit: Option<u64>,
    /// The selected columns, parallel to `select`
    pub columns: Vec<QueryColumn>,
}

impl QueryPlan {
    /// Clauses in statement order, one per line, select items indented.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.keyword(Keyword::Select);
        for (i, item) in self.select.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.newline().indent(1);
            item.write(&mut ts);
        }

        ts.newline().keyword(Keyword::From).space();
        self.from.write(&mut ts);

        for join in &self.joins {
            ts.newline();
            join.write(&mut ts);
        }

        if let Some(condition) = &self.where_clause {
            ts.newline().keyword(Keyword::Where).space();
            condition.write(&mut ts);
        }

        if !self.group_by.is_empty() {
            ts.newline()
                .keyword(Keyword::GroupBy)
                .space()
                .separated(&self.group_by, |ts, expr| expr.write(ts));
        }

        if let Some(condition) = &self.having {
            ts.newline().keyword(Keyword::Having).space();
            condition.write(&mut ts);
        }

        if !self.order_by.is_empty() {
            ts.newline()
                .keyword(Keyword::OrderBy)
                .space()
                .separated(&self.order_by, |ts, term| term.write(ts));
        }

        if let Some(rows) = self.limit {
            ts.newline().push(Token::Limit {
                rows,
                ordered: !self.order_by.is_empty(),
            });
        }

        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }

    /// Result column aliases, in SELECT order.
    pub fn aliases(&self) -> Vec<String> {
        self.columns.iter().map(QueryColumn::alias).collect()
    }

    /// Display labels keyed by result column alias.
    pub fn labels(&self) -> Vec<(String, Label)> {
        self.columns
            .iter()
            .map(|column| (column.alias(), column.label()))
            .collect()
    }
}
