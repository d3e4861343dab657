//! Dimensions and the references facts hold to them.

use std::sync::Arc;

use super::column::{ColumnLike, SchemaColumn};
use super::hierarchy::HierarchyGraph;
use super::label::humanize;
use super::types::AbstractType;

/// Conventional name of a dimension's natural/source key column.
pub const DEFAULT_ORIGINAL_KEY: &str = "original_id";

/// Suffix of the fact-side foreign key column: `<alias>_dimension_id`.
pub const FOREIGN_KEY_SUFFIX: &str = "_dimension_id";

/// A table of descriptive attributes referenced by facts.
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct Dimension {
    name: String,
    label: Option<String>,
    columns: Vec<SchemaColumn>,
    /// Human-readable identifier columns, main identifier first
    identifiers: Vec<String>,
    original_key: Option<String>,
    hierarchy: HierarchyGraph,
}

impl Dimension {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            label: None,
            columns: Vec::new(),
            identifiers: Vec::new(),
            original_key: None,
            hierarchy: HierarchyGraph::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn column(mut self, column: SchemaColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Declare an identifier column. The first one declared is the main identifier.
    pub fn identifier(mut self, column: &str) -> Self {
        self.identifiers.push(column.into());
        self
    }

    /// Make the dimension identifiable through the conventional `original_id` key.
    pub fn identifiable(self) -> Self {
        self.with_original_key(DEFAULT_ORIGINAL_KEY)
    }

    /// Make the dimension identifiable through `column`, declaring it if needed.
    pub fn with_original_key(mut self, column: &str) -> Self {
        if self.find_column(column).is_none() {
            self.columns.push(
                SchemaColumn::new(column, AbstractType::Integer)
                    .not_null()
                    .internal(),
            );
        }
        self.original_key = Some(column.into());
        self
    }

    /// Declare that grouping on `element` determines each of `others`.
    pub fn implies(mut self, element: &str, others: &[&str]) -> Self {
        self.hierarchy.implies(element, others);
        self
    }

    /// Declare that `a` and `b` determine each other.
    pub fn bidirectional(mut self, a: &str, b: &str) -> Self {
        self.hierarchy.bidirectional(a, b);
        self
    }

    fn find_column(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn get_column(&self, name: &str) -> Option<&SchemaColumn> {
        self.find_column(name)
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn main_identifier(&self) -> Option<&str> {
        self.identifiers.first().map(String::as_str)
    }

    pub fn is_identifier(&self, column: &str) -> bool {
        self.identifiers.iter().any(|i| i == column)
    }

    pub fn original_key(&self) -> Option<&str> {
        self.original_key.as_deref()
    }

    /// Whether the dimension carries a stable natural key.
    pub fn is_identifiable(&self) -> bool {
        self.original_key.is_some()
    }

    pub fn hierarchy(&self) -> &HierarchyGraph {
        &self.hierarchy
    }
}

impl ColumnLike for Dimension {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| humanize(&self.name))
    }

    fn abstract_type(&self) -> AbstractType {
        self.main_identifier()
            .and_then(|id| self.find_column(id))
            .map(|c| c.abstract_type())
            .unwrap_or(AbstractType::Integer)
    }
}

/// A fact's foreign key to a dimension, optionally role-played under an alias.
#[derive(Debug, Clone)]
pub struct DimensionReference {
    dimension: Arc<Dimension>,
    alias: String,
    foreign_key: Option<String>,
}

impl DimensionReference {
    pub fn new(dimension: &Arc<Dimension>) -> Self {
        Self {
            dimension: Arc::clone(dimension),
            alias: dimension.name().to_string(),
            foreign_key: None,
        }
    }

    /// Role-play the dimension under `alias` (order_date, ship_date, ...).
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = alias.into();
        self
    }

    /// Override the `<alias>_dimension_id` foreign key column.
    pub fn with_foreign_key(mut self, column: &str) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    pub fn dimension(&self) -> &Arc<Dimension> {
        &self.dimension
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn foreign_key(&self) -> String {
        self.foreign_key
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.alias, FOREIGN_KEY_SUFFIX))
    }

    pub fn is_role_played(&self) -> bool {
        self.alias != self.dimension.name()
    }
}

impl ColumnLike for DimensionReference {
    fn name(&self) -> &str {
        &self.alias
    }

    fn label(&self) -> String {
        if self.is_role_played() {
            humanize(&self.alias)
        } else {
            self.dimension.label()
        }
    }

    fn abstract_type(&self) -> AbstractType {
        self.dimension.abstract_type()
    }
}
