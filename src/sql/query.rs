//! Clauses of a compiled SELECT.
//!
//! Each clause writes itself into a [`TokenStream`]; the statement layout
//! lives with [`QueryPlan`](crate::query::QueryPlan).

use super::expr::Expr;
use super::token::{Keyword, Token, TokenStream};

// =============================================================================
// SELECT list
// =============================================================================

/// One result column: `expr AS "alias"`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: String,
}

impl SelectItem {
    pub fn new(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: alias.into(),
        }
    }

    pub fn write(&self, ts: &mut TokenStream) {
        self.expr.write(ts);
        ts.space()
            .keyword(Keyword::As)
            .space()
            .push(Token::Ident(self.alias.clone()));
    }
}

// =============================================================================
// Tables and joins
// =============================================================================

/// A table, optionally under an alias.
///
/// Role-played dimensions join the same physical table more than once, each
/// time under its own alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The name columns of this table are qualified with.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub fn write(&self, ts: &mut TokenStream) {
        ts.push(Token::Ident(self.table.clone()));
        match &self.alias {
            Some(alias) if alias != &self.table => {
                ts.space()
                    .keyword(Keyword::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
            }
            _ => {}
        }
    }
}

/// `INNER JOIN table ON on`. Every dimension row a fact points at exists,
/// so compiled queries only ever inner join.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: TableRef,
    pub on: Expr,
}

impl Join {
    pub fn write(&self, ts: &mut TokenStream) {
        ts.keyword(Keyword::InnerJoin).space();
        self.table.write(ts);
        ts.space().keyword(Keyword::On).space();
        self.on.write(ts);
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn keyword(self) -> Keyword {
        match self {
            SortDir::Asc => Keyword::Asc,
            SortDir::Desc => Keyword::Desc,
        }
    }
}

/// One ORDER BY term. The direction is always written out.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub expr: Expr,
    pub dir: SortDir,
}

impl OrderTerm {
    pub fn new(expr: Expr, dir: SortDir) -> Self {
        Self { expr, dir }
    }

    pub fn write(&self, ts: &mut TokenStream) {
        self.expr.write(ts);
        ts.space().keyword(self.dir.keyword());
    }
}
