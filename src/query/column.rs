//! Resolved query columns.
//!
//! A [`QueryColumn`] is what a reference string turns into once it has been
//! resolved against a [`Schema`](crate::schema::Schema). Each shape knows how
//! to render itself for the different clauses of a query:
//!
//! | Shape        | SELECT                 | GROUP BY         | COUNT                 |
//! |--------------|------------------------|------------------|-----------------------|
//! | `Qualified`  | `owner.column`         | `owner.column`   | `owner.column`        |
//! | `Dimension`  | `alias.main_identifier`| `alias.key`      | `alias.key` distinct  |
//! | `Identifier` | `alias.identifier`     | `alias.key`      | `alias.key` distinct  |
//! | `Calculated` | declared expression    | none             | declared expression   |
//! | `Aggregate`  | `OP(inner)`            | none             | n/a                   |
//! | `Pivoted`    | `CASE WHEN .. END`     | none             | `CASE WHEN .. END`    |
//!
//! `key` is the dimension's original key, or its surrogate key when the
//! dimension is not identifiable.

use std::fmt;

use super::aggregate::AggregateOp;
use crate::schema::label::pluralize_label;
use crate::schema::{AbstractType, ColumnLike, SchemaColumn, SchemaEntity};
use crate::sql::expr::{case_when, count, count_distinct, table_col, Expr, ExprExt};
use crate::value::Value;

/// Display label of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Text(String),
    /// A pivoted cell: the wrapped column's label and the pivot value.
    Pivot { base: String, value: Value },
}

impl Label {
    /// The label without any pivot value.
    pub fn base(&self) -> &str {
        match self {
            Label::Text(text) => text,
            Label::Pivot { base, .. } => base,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Text(text) => f.write_str(text),
            Label::Pivot { base, value } => write!(f, "{} ({})", base, value),
        }
    }
}

/// A resolved reference, ready to be placed in a query.
#[derive(Debug, Clone)]
pub enum QueryColumn {
    /// A plain attribute of a fact or dimension.
    Qualified {
        owner: SchemaEntity,
        column: SchemaColumn,
    },

    /// A bare dimension reference, displayed through its main identifier.
    Dimension {
        owner: SchemaEntity,
        identifier: Option<String>,
        key: String,
    },

    /// An explicit identifier column of an identifiable dimension.
    Identifier {
        owner: SchemaEntity,
        column: SchemaColumn,
        key: String,
    },

    /// A column backed by a declared expression.
    Calculated {
        owner: SchemaEntity,
        column: SchemaColumn,
    },

    Aggregate {
        inner: Box<QueryColumn>,
        op: AggregateOp,
    },

    /// One crosstab cell: `value` when `pivot` equals `pivot_value`, NULL otherwise.
    Pivoted {
        value: Box<QueryColumn>,
        pivot: Box<QueryColumn>,
        index: usize,
        pivot_value: Value,
    },
}

impl QueryColumn {
    pub fn aggregate(self, op: AggregateOp) -> Self {
        QueryColumn::Aggregate {
            inner: Box::new(self),
            op,
        }
    }

    pub fn select_expr(&self) -> Expr {
        match self {
            QueryColumn::Qualified { owner, column } | QueryColumn::Identifier { owner, column, .. } => {
                table_col(owner.alias(), column.name())
            }
            QueryColumn::Dimension {
                owner,
                identifier,
                key,
            } => table_col(owner.alias(), identifier.as_deref().unwrap_or(key)),
            QueryColumn::Calculated { owner, column } => column
                .calculation()
                .cloned()
                .unwrap_or_else(|| table_col(owner.alias(), column.name())),
            QueryColumn::Aggregate { inner, op } => match op {
                AggregateOp::Count if inner.counts_distinct() => {
                    count_distinct(inner.count_expr())
                }
                AggregateOp::Count => count(inner.count_expr()),
                _ => op.apply(inner.select_expr()),
            },
            QueryColumn::Pivoted {
                value,
                pivot,
                pivot_value,
                ..
            } => pivot_cell(pivot, pivot_value, value.select_expr()),
        }
    }

    /// The expression rows are grouped on, if the column is grouped at all.
    pub fn group_expr(&self) -> Option<Expr> {
        match self {
            QueryColumn::Qualified { owner, column } => {
                Some(table_col(owner.alias(), column.name()))
            }
            QueryColumn::Dimension { owner, key, .. } | QueryColumn::Identifier { owner, key, .. } => {
                Some(table_col(owner.alias(), key))
            }
            QueryColumn::Calculated { .. }
            | QueryColumn::Aggregate { .. }
            | QueryColumn::Pivoted { .. } => None,
        }
    }

    /// The expression `count` aggregates over.
    pub fn count_expr(&self) -> Expr {
        match self {
            QueryColumn::Dimension { owner, key, .. } | QueryColumn::Identifier { owner, key, .. } => {
                table_col(owner.alias(), key)
            }
            QueryColumn::Pivoted {
                value,
                pivot,
                pivot_value,
                ..
            } => pivot_cell(pivot, pivot_value, value.count_expr()),
            _ => self.select_expr(),
        }
    }

    /// Dimensions sort on their main identifier, not their key.
    pub fn order_expr(&self) -> Expr {
        self.select_expr()
    }

    /// Whether `count` over this column should count distinct keys.
    fn counts_distinct(&self) -> bool {
        match self {
            QueryColumn::Dimension { .. } | QueryColumn::Identifier { .. } => true,
            QueryColumn::Pivoted { value, .. } => value.counts_distinct(),
            _ => false,
        }
    }

    /// Unique name of the column within one query.
    pub fn alias(&self) -> String {
        match self {
            QueryColumn::Qualified { owner, column }
            | QueryColumn::Identifier { owner, column, .. }
            | QueryColumn::Calculated { owner, column } => {
                format!("{}.{}", owner.alias(), column.name())
            }
            QueryColumn::Dimension { owner, .. } => owner.alias().to_string(),
            QueryColumn::Aggregate { inner, op } => format!("{}.{}", inner.alias(), op.keyword()),
            QueryColumn::Pivoted {
                value,
                pivot,
                index,
                ..
            } => format!("{}~{}.{}", value.alias(), pivot.alias(), index),
        }
    }

    pub fn label(&self) -> Label {
        match self {
            QueryColumn::Qualified { column, .. }
            | QueryColumn::Identifier { column, .. }
            | QueryColumn::Calculated { column, .. } => Label::Text(column.label()),
            QueryColumn::Dimension { owner, .. } => Label::Text(owner.label()),
            QueryColumn::Aggregate { inner, op } => {
                let describe = |base: &str| match (op, inner.counts_distinct()) {
                    (AggregateOp::Count, true) => format!("No. of {}", pluralize_label(base)),
                    _ => format!("{} of {}", op.label(), base),
                };
                match inner.label() {
                    Label::Text(base) => Label::Text(describe(&base)),
                    Label::Pivot { base, value } => Label::Pivot {
                        base: describe(&base),
                        value,
                    },
                }
            }
            QueryColumn::Pivoted {
                value, pivot_value, ..
            } => Label::Pivot {
                base: value.label().base().to_string(),
                value: pivot_value.clone(),
            },
        }
    }

    /// Tables that must be joined for this column to be computed.
    pub fn owners(&self) -> Vec<&SchemaEntity> {
        match self {
            QueryColumn::Qualified { owner, .. }
            | QueryColumn::Dimension { owner, .. }
            | QueryColumn::Identifier { owner, .. }
            | QueryColumn::Calculated { owner, .. } => vec![owner],
            QueryColumn::Aggregate { inner, .. } => inner.owners(),
            QueryColumn::Pivoted { value, pivot, .. } => {
                let mut owners = value.owners();
                owners.extend(pivot.owners());
                owners
            }
        }
    }

    /// The table whose hierarchy graph this column participates in.
    pub fn owner(&self) -> Option<&SchemaEntity> {
        match self {
            QueryColumn::Qualified { owner, .. }
            | QueryColumn::Dimension { owner, .. }
            | QueryColumn::Identifier { owner, .. }
            | QueryColumn::Calculated { owner, .. } => Some(owner),
            QueryColumn::Aggregate { .. } | QueryColumn::Pivoted { .. } => None,
        }
    }

    /// Name of the column inside its owner's hierarchy graph.
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            QueryColumn::Qualified { column, .. }
            | QueryColumn::Identifier { column, .. }
            | QueryColumn::Calculated { column, .. } => Some(column.name()),
            QueryColumn::Dimension {
                identifier, key, ..
            } => Some(identifier.as_deref().unwrap_or(key)),
            QueryColumn::Aggregate { .. } | QueryColumn::Pivoted { .. } => None,
        }
    }

    /// Whether filters on this column belong in HAVING rather than WHERE.
    pub fn is_aggregate(&self) -> bool {
        match self {
            QueryColumn::Aggregate { .. } => true,
            QueryColumn::Calculated { column, .. } => column
                .calculation()
                .is_some_and(Expr::contains_aggregate),
            QueryColumn::Pivoted { value, .. } => value.is_aggregate(),
            _ => false,
        }
    }

    /// Type of the values this column produces.
    pub fn abstract_type(&self) -> AbstractType {
        match self {
            QueryColumn::Qualified { column, .. }
            | QueryColumn::Identifier { column, .. }
            | QueryColumn::Calculated { column, .. } => column.abstract_type(),
            QueryColumn::Dimension { owner, .. } => owner
                .as_dimension()
                .map(|d| d.abstract_type())
                .unwrap_or(AbstractType::Integer),
            QueryColumn::Aggregate { inner, op } => match op {
                AggregateOp::Count => AbstractType::Integer,
                AggregateOp::Avg | AggregateOp::Variance | AggregateOp::Stddev => {
                    AbstractType::Float
                }
                _ => inner.abstract_type(),
            },
            QueryColumn::Pivoted { value, .. } => value.abstract_type(),
        }
    }

    /// The schema column backing this query column, when there is exactly one.
    pub fn schema_column(&self) -> Option<&SchemaColumn> {
        match self {
            QueryColumn::Qualified { column, .. }
            | QueryColumn::Identifier { column, .. }
            | QueryColumn::Calculated { column, .. } => Some(column),
            _ => None,
        }
    }
}

fn pivot_cell(pivot: &QueryColumn, pivot_value: &Value, then: Expr) -> Expr {
    case_when(pivot.select_expr().eq(pivot_value.to_expr()), then)
}
