//! Expressions a compiled dimensional query is made of.
//!
//! Column references, literals, comparisons and arithmetic, single-argument
//! aggregate calls, pivot cells (`CASE WHEN .. THEN .. END`) and IN lists.
//! Expressions are dialect-agnostic; dialect differences are applied when the
//! token stream is serialized.

use super::dialect::Dialect;
use super::token::{Keyword, Token, TokenStream};

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `table.column`, or a bare column when `table` is `None`
    Column {
        table: Option<String>,
        column: String,
    },

    Literal(Literal),

    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// `NAME([DISTINCT] arg)`. The name is remapped per dialect on output.
    Function {
        name: String,
        arg: Box<Expr>,
        distinct: bool,
    },

    /// `CASE WHEN condition THEN then END`, NULL when the condition fails.
    CaseWhen {
        condition: Box<Expr>,
        then: Box<Expr>,
    },

    /// `expr IN (values...)`
    In { expr: Box<Expr>, values: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Plus,
    Minus,
    Mul,
    Div,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Lte => "<=",
            BinaryOperator::Gte => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
        }
    }

    /// Binding strength; higher binds tighter.
    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::And => 1,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Gt
            | BinaryOperator::Lte
            | BinaryOperator::Gte => 2,
            BinaryOperator::Plus | BinaryOperator::Minus => 3,
            BinaryOperator::Mul | BinaryOperator::Div => 4,
        }
    }
}

impl Expr {
    /// Append this expression's tokens to `ts`.
    pub fn write(&self, ts: &mut TokenStream) {
        match self {
            Expr::Column { table, column } => {
                if let Some(table) = table {
                    ts.push(Token::Ident(table.clone())).push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(literal) => {
                ts.push(Token::Literal(literal.clone()));
            }

            Expr::BinaryOp { left, op, right } => {
                // `a - (b - c)` keeps its parentheses, `(a - b) - c` does not need them
                write_operand(ts, left, op.precedence());
                ts.space().push(Token::Operator(*op)).space();
                write_operand(ts, right, op.precedence() + 1);
            }

            Expr::Function {
                name,
                arg,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone())).lparen();
                if *distinct {
                    ts.keyword(Keyword::Distinct).space();
                }
                arg.write(ts);
                ts.rparen();
            }

            Expr::CaseWhen { condition, then } => {
                ts.keyword(Keyword::Case).space().keyword(Keyword::When).space();
                condition.write(ts);
                ts.space().keyword(Keyword::Then).space();
                then.write(ts);
                ts.space().keyword(Keyword::End);
            }

            Expr::In { expr, values } => {
                // `x IN ()` is not valid SQL; nothing matches an empty list
                if values.is_empty() {
                    ts.keyword(Keyword::False);
                    return;
                }
                expr.write(ts);
                ts.space().keyword(Keyword::In).space().lparen();
                ts.separated(values, |ts, value| value.write(ts));
                ts.rparen();
            }
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        self.write(&mut ts);
        ts
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }

    /// Whether an aggregate function call appears anywhere in the expression.
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expr::Function { name, arg, .. } => {
                AGGREGATE_FUNCTIONS
                    .iter()
                    .any(|f| f.eq_ignore_ascii_case(name))
                    || arg.contains_aggregate()
            }
            Expr::BinaryOp { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            Expr::CaseWhen { condition, then } => {
                condition.contains_aggregate() || then.contains_aggregate()
            }
            Expr::In { expr, values } => {
                expr.contains_aggregate() || values.iter().any(Expr::contains_aggregate)
            }
            Expr::Column { .. } | Expr::Literal(_) => false,
        }
    }
}

fn write_operand(ts: &mut TokenStream, operand: &Expr, min_precedence: u8) {
    match operand {
        Expr::BinaryOp { op, .. } if op.precedence() < min_precedence => {
            ts.lparen();
            operand.write(ts);
            ts.rparen();
        }
        _ => operand.write(ts),
    }
}

const AGGREGATE_FUNCTIONS: &[&str] = &[
    "COUNT",
    "SUM",
    "AVG",
    "MIN",
    "MAX",
    "VAR_SAMP",
    "STDDEV_SAMP",
];

// =============================================================================
// Constructors
// =============================================================================

pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

pub fn lit_float(f: f64) -> Expr {
    Expr::Literal(Literal::Float(f))
}

pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

pub fn lit_bool(b: bool) -> Expr {
    Expr::Literal(Literal::Bool(b))
}

pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// `NAME(arg)`
pub fn func(name: &str, arg: Expr) -> Expr {
    Expr::Function {
        name: name.into(),
        arg: Box::new(arg),
        distinct: false,
    }
}

pub fn count(expr: Expr) -> Expr {
    func("COUNT", expr)
}

/// `COUNT(DISTINCT expr)`
pub fn count_distinct(expr: Expr) -> Expr {
    Expr::Function {
        name: "COUNT".into(),
        arg: Box::new(expr),
        distinct: true,
    }
}

pub fn sum(expr: Expr) -> Expr {
    func("SUM", expr)
}

pub fn max(expr: Expr) -> Expr {
    func("MAX", expr)
}

pub fn case_when(condition: Expr, then: Expr) -> Expr {
    Expr::CaseWhen {
        condition: Box::new(condition),
        then: Box::new(then),
    }
}

// =============================================================================
// Builder trait
// =============================================================================

/// Fluent operators for building expressions, mostly for calculated columns.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn eq(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Eq, other.into())
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Ne, other.into())
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gt, other.into())
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gte, other.into())
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lt, other.into())
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lte, other.into())
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::And, other.into())
    }

    fn add(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Plus, other.into())
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Minus, other.into())
    }

    fn mul(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Mul, other.into())
    }

    fn div(self, other: impl Into<Expr>) -> Expr {
        binary(self.into_expr(), BinaryOperator::Div, other.into())
    }

    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
        }
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        lit_float(f)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        lit_bool(b)
    }
}
