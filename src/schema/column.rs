//! Schema columns: typed, immutable descriptions of fact and dimension attributes.

use super::label::humanize;
use super::types::AbstractType;
use crate::sql::expr::Expr;
use crate::value::Value;

/// Capabilities shared by everything that can stand in a column position:
/// plain columns, dimensions, and dimension references.
pub trait ColumnLike {
    fn name(&self) -> &str;

    fn label(&self) -> String;

    fn abstract_type(&self) -> AbstractType;
}

/// A fact or dimension attribute.
///
/// Built with the consuming `with_*` / flag methods and never mutated
/// afterwards. Equality is structural over every attribute.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SchemaColumn {
    name: String,
    label: Option<String>,
    abstract_type: AbstractType,
    min: Option<i64>,
    max: Option<i64>,
    elements: Option<Vec<Value>>,
    nullable: bool,
    countable: bool,
    semi_additive: bool,
    descriptive: bool,
    internal: bool,
    calculation: Option<Expr>,
}

impl SchemaColumn {
    pub fn new(name: &str, abstract_type: AbstractType) -> Self {
        Self {
            name: name.into(),
            label: None,
            abstract_type,
            min: None,
            max: None,
            elements: None,
            nullable: true,
            countable: false,
            semi_additive: false,
            descriptive: false,
            internal: false,
            calculation: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Numeric bounds. Ignored unless the column type is numeric.
    pub fn with_bounds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if self.abstract_type.is_numeric() {
            self.min = min;
            self.max = max;
        }
        self
    }

    /// Restrict the column to a finite set of values.
    pub fn with_elements(mut self, elements: Vec<Value>) -> Self {
        self.elements = Some(elements);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Allow `count` aggregation on this column.
    pub fn countable(mut self) -> Self {
        self.countable = true;
        self
    }

    /// Mark as averageable but not summable (balances, inventory levels).
    pub fn semi_additive(mut self) -> Self {
        self.semi_additive = true;
        self
    }

    /// Display-only attribute, not meant for filtering or grouping.
    pub fn descriptive(mut self) -> Self {
        self.descriptive = true;
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Back the column by a declared expression instead of a physical column.
    pub fn calculated(mut self, expr: Expr) -> Self {
        self.calculation = Some(expr);
        self
    }

    pub fn min(&self) -> Option<i64> {
        self.min
    }

    pub fn max(&self) -> Option<i64> {
        self.max
    }

    /// Derived from the lower bound; only meaningful for numeric columns.
    pub fn unsigned(&self) -> bool {
        self.abstract_type.is_numeric() && self.min.is_some_and(|m| m >= 0)
    }

    pub fn elements(&self) -> Option<&[Value]> {
        self.elements.as_deref()
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_countable(&self) -> bool {
        self.countable
    }

    pub fn is_semi_additive(&self) -> bool {
        self.semi_additive
    }

    pub fn is_descriptive(&self) -> bool {
        self.descriptive
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn calculation(&self) -> Option<&Expr> {
        self.calculation.as_ref()
    }

    pub fn is_virtual(&self) -> bool {
        self.calculation.is_some()
    }
}

impl ColumnLike for SchemaColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| humanize(&self.name))
    }

    fn abstract_type(&self) -> AbstractType {
        self.abstract_type
    }
}
