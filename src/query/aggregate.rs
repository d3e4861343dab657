//! Aggregation operators and their eligibility rules.

use std::fmt;
use std::str::FromStr;

use crate::schema::AbstractType;
use crate::sql::expr::{func, Expr};

/// An aggregation operator usable as a reference prefix or suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    Variance,
    Stddev,
}

impl AggregateOp {
    pub const ALL: [AggregateOp; 7] = [
        AggregateOp::Sum,
        AggregateOp::Avg,
        AggregateOp::Count,
        AggregateOp::Min,
        AggregateOp::Max,
        AggregateOp::Variance,
        AggregateOp::Stddev,
    ];

    /// Parse a reference keyword (`sum`, `avg`, ...). Case-insensitive.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.keyword().eq_ignore_ascii_case(keyword))
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            AggregateOp::Sum => "sum",
            AggregateOp::Avg => "avg",
            AggregateOp::Count => "count",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Variance => "variance",
            AggregateOp::Stddev => "stddev",
        }
    }

    /// SQL function; variance and stddev map to their sample forms.
    pub fn function_name(&self) -> &'static str {
        match self {
            AggregateOp::Sum => "SUM",
            AggregateOp::Avg => "AVG",
            AggregateOp::Count => "COUNT",
            AggregateOp::Min => "MIN",
            AggregateOp::Max => "MAX",
            AggregateOp::Variance => "VAR_SAMP",
            AggregateOp::Stddev => "STDDEV_SAMP",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AggregateOp::Sum => "Sum",
            AggregateOp::Avg => "Average",
            AggregateOp::Count => "Count",
            AggregateOp::Min => "Minimum",
            AggregateOp::Max => "Maximum",
            AggregateOp::Variance => "Variance",
            AggregateOp::Stddev => "Std. Deviation",
        }
    }

    /// Whether the operator only makes sense over numeric input.
    pub fn requires_numeric(&self) -> bool {
        matches!(
            self,
            AggregateOp::Sum | AggregateOp::Avg | AggregateOp::Variance | AggregateOp::Stddev
        )
    }

    /// Why this operator cannot be applied to a column with these traits, if it can't.
    pub fn rejection(
        &self,
        abstract_type: AbstractType,
        semi_additive: bool,
        countable: bool,
    ) -> Option<&'static str> {
        match self {
            AggregateOp::Count if !countable => Some("column is not countable"),
            AggregateOp::Sum if semi_additive => Some("semi-additive columns cannot be summed"),
            op if op.requires_numeric() && !abstract_type.is_numeric() => {
                Some("column is not numeric")
            }
            _ => None,
        }
    }

    pub fn apply(&self, expr: Expr) -> Expr {
        func(self.function_name(), expr)
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for AggregateOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| format!("unknown aggregation: {}", s))
    }
}
