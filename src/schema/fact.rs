//! Facts: tables of measured events linked to dimensions.

use std::sync::Arc;

use super::column::{ColumnLike, SchemaColumn};
use super::dimension::{Dimension, DimensionReference};
use super::hierarchy::HierarchyGraph;
use super::label::humanize;

/// A fact table.
#[derive(Debug, Clone)]
#[must_use = "builders have no effect until used"]
pub struct Fact {
    name: String,
    label: Option<String>,
    dimensions: Vec<DimensionReference>,
    degenerates: Vec<SchemaColumn>,
    measures: Vec<SchemaColumn>,
    hierarchy: HierarchyGraph,
}

/// A column of a fact, seen through what kind of column it is.
#[derive(Debug, Clone, Copy)]
pub enum FactColumn<'a> {
    Dimension(&'a DimensionReference),
    Degenerate(&'a SchemaColumn),
    Measure(&'a SchemaColumn),
}

impl<'a> FactColumn<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            FactColumn::Dimension(reference) => reference.alias(),
            FactColumn::Degenerate(column) | FactColumn::Measure(column) => column.name(),
        }
    }

    /// The plain column behind a degenerate dimension or measure.
    pub fn as_column(&self) -> Option<&'a SchemaColumn> {
        match *self {
            FactColumn::Dimension(_) => None,
            FactColumn::Degenerate(column) | FactColumn::Measure(column) => Some(column),
        }
    }
}

impl Fact {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            label: None,
            dimensions: Vec::new(),
            degenerates: Vec::new(),
            measures: Vec::new(),
            hierarchy: HierarchyGraph::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Reference a dimension under its own name.
    pub fn dimension(self, dimension: &Arc<Dimension>) -> Self {
        self.reference(DimensionReference::new(dimension))
    }

    /// Reference a dimension under a role-playing alias.
    pub fn role(self, alias: &str, dimension: &Arc<Dimension>) -> Self {
        self.reference(DimensionReference::new(dimension).with_alias(alias))
    }

    pub fn reference(mut self, reference: DimensionReference) -> Self {
        self.dimensions.push(reference);
        self
    }

    /// A fact attribute used for grouping/filtering with no dimension table.
    pub fn degenerate(mut self, column: SchemaColumn) -> Self {
        self.degenerates.push(column);
        self
    }

    pub fn measure(mut self, column: SchemaColumn) -> Self {
        self.measures.push(column);
        self
    }

    pub fn implies(mut self, element: &str, others: &[&str]) -> Self {
        self.hierarchy.implies(element, others);
        self
    }

    pub fn bidirectional(mut self, a: &str, b: &str) -> Self {
        self.hierarchy.bidirectional(a, b);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| humanize(&self.name))
    }

    pub fn dimensions(&self) -> &[DimensionReference] {
        &self.dimensions
    }

    pub fn degenerates(&self) -> &[SchemaColumn] {
        &self.degenerates
    }

    pub fn measures(&self) -> &[SchemaColumn] {
        &self.measures
    }

    /// References, degenerate dimensions and measures, in that order.
    pub fn columns(&self) -> impl Iterator<Item = FactColumn<'_>> {
        self.dimensions
            .iter()
            .map(FactColumn::Dimension)
            .chain(self.degenerates.iter().map(FactColumn::Degenerate))
            .chain(self.measures.iter().map(FactColumn::Measure))
    }

    pub fn get_column(&self, name: &str) -> Option<FactColumn<'_>> {
        self.columns().find(|c| c.name() == name)
    }

    /// The reference held under `alias`, if any.
    pub fn dimension_reference(&self, alias: &str) -> Option<&DimensionReference> {
        self.dimensions.iter().find(|d| d.alias() == alias)
    }

    pub fn is_factless(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn hierarchy(&self) -> &HierarchyGraph {
        &self.hierarchy
    }
}
