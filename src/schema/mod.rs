//! Dimensional schema model: facts, dimensions, columns and hierarchies.
//!
//! A [`Schema`] is an explicit value passed to the compiler; there is no
//! process-wide registry of definitions. Everything in it is immutable once
//! registered and shared through `Arc`, so compilations can read it
//! concurrently without synchronization.

pub mod column;
pub mod dimension;
pub mod fact;
pub mod hierarchy;
pub mod label;
pub mod types;

pub use column::{ColumnLike, SchemaColumn};
pub use dimension::{Dimension, DimensionReference, DEFAULT_ORIGINAL_KEY, FOREIGN_KEY_SUFFIX};
pub use fact::{Fact, FactColumn};
pub use hierarchy::HierarchyGraph;
pub use types::AbstractType;

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::sql::query::TableRef;

/// Errors raised while registering tables in a [`Schema`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("Table already defined: {0}")]
    DuplicateTable(String),

    #[error("Column {column} defined more than once on {table}")]
    DuplicateColumn { table: String, column: String },

    #[error("Identifier {column} is not a column of dimension {dimension}")]
    UnknownIdentifier { dimension: String, column: String },

    #[error("Hierarchy element {column} is not a column of {table}")]
    UnknownHierarchyColumn { table: String, column: String },

    #[error("Fact {fact} references unregistered dimension {dimension}")]
    UnregisteredDimension { fact: String, dimension: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Every fact and dimension the compiler can resolve references against.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    facts: IndexMap<String, Arc<Fact>>,
    dimensions: IndexMap<String, Arc<Dimension>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_unique_table(&self, name: &str) -> SchemaResult<()> {
        if self.facts.contains_key(name) || self.dimensions.contains_key(name) {
            return Err(SchemaError::DuplicateTable(name.to_string()));
        }
        Ok(())
    }

    /// Validate and register a dimension, returning the shared handle facts reference.
    pub fn add_dimension(&mut self, dimension: Dimension) -> SchemaResult<Arc<Dimension>> {
        let name = dimension.name().to_string();
        self.ensure_unique_table(&name)?;

        ensure_unique_columns(&name, dimension.columns().iter().map(|c| c.name()))?;

        for identifier in dimension.identifiers() {
            if dimension.get_column(identifier).is_none() {
                return Err(SchemaError::UnknownIdentifier {
                    dimension: name,
                    column: identifier.clone(),
                });
            }
        }

        for element in dimension.hierarchy().elements() {
            if dimension.get_column(element).is_none() {
                return Err(SchemaError::UnknownHierarchyColumn {
                    table: name,
                    column: element.to_string(),
                });
            }
        }

        let dimension = Arc::new(dimension);
        self.dimensions.insert(name, Arc::clone(&dimension));
        Ok(dimension)
    }

    /// Validate and register a fact. Its referenced dimensions must already be registered.
    pub fn add_fact(&mut self, fact: Fact) -> SchemaResult<Arc<Fact>> {
        let name = fact.name().to_string();
        self.ensure_unique_table(&name)?;

        ensure_unique_columns(&name, fact.columns().map(|c| c.name()))?;

        for reference in fact.dimensions() {
            let dimension = reference.dimension().name();
            if !self.dimensions.contains_key(dimension) {
                return Err(SchemaError::UnregisteredDimension {
                    fact: name,
                    dimension: dimension.to_string(),
                });
            }
        }

        for element in fact.hierarchy().elements() {
            if fact.get_column(element).is_none() {
                return Err(SchemaError::UnknownHierarchyColumn {
                    table: name,
                    column: element.to_string(),
                });
            }
        }

        let fact = Arc::new(fact);
        self.facts.insert(name, Arc::clone(&fact));
        Ok(fact)
    }

    pub fn fact(&self, name: &str) -> Option<&Arc<Fact>> {
        self.facts.get(name)
    }

    pub fn dimension(&self, name: &str) -> Option<&Arc<Dimension>> {
        self.dimensions.get(name)
    }

    /// Look up a fact or dimension by name.
    pub fn entity(&self, name: &str) -> Option<SchemaEntity> {
        if let Some(fact) = self.facts.get(name) {
            return Some(SchemaEntity::Fact(Arc::clone(fact)));
        }
        self.dimensions
            .get(name)
            .map(|d| SchemaEntity::Dimension(Arc::clone(d)))
    }

    pub fn facts(&self) -> impl Iterator<Item = &Arc<Fact>> {
        self.facts.values()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &Arc<Dimension>> {
        self.dimensions.values()
    }
}

fn ensure_unique_columns<'a>(
    table: &str,
    names: impl Iterator<Item = &'a str>,
) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateColumn {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

/// A table a query column can belong to.
///
/// Call sites match on the variant; a reference is never passed off as the
/// dimension it points to.
#[derive(Debug, Clone)]
pub enum SchemaEntity {
    Fact(Arc<Fact>),
    Dimension(Arc<Dimension>),
    /// A dimension reached through a fact's (possibly role-played) reference
    Reference(DimensionReference),
}

impl SchemaEntity {
    /// The name columns of this table are qualified with in SQL.
    pub fn alias(&self) -> &str {
        match self {
            SchemaEntity::Fact(fact) => fact.name(),
            SchemaEntity::Dimension(dimension) => dimension.name(),
            SchemaEntity::Reference(reference) => reference.alias(),
        }
    }

    /// The physical table name.
    pub fn table_name(&self) -> &str {
        match self {
            SchemaEntity::Fact(fact) => fact.name(),
            SchemaEntity::Dimension(dimension) => dimension.name(),
            SchemaEntity::Reference(reference) => reference.dimension().name(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            SchemaEntity::Fact(fact) => fact.label(),
            SchemaEntity::Dimension(dimension) => dimension.label(),
            SchemaEntity::Reference(reference) => reference.label(),
        }
    }

    pub fn hierarchy(&self) -> &HierarchyGraph {
        match self {
            SchemaEntity::Fact(fact) => fact.hierarchy(),
            SchemaEntity::Dimension(dimension) => dimension.hierarchy(),
            SchemaEntity::Reference(reference) => reference.dimension().hierarchy(),
        }
    }

    /// The dimension behind this entity, if it is one.
    pub fn as_dimension(&self) -> Option<&Arc<Dimension>> {
        match self {
            SchemaEntity::Fact(_) => None,
            SchemaEntity::Dimension(dimension) => Some(dimension),
            SchemaEntity::Reference(reference) => Some(reference.dimension()),
        }
    }

    pub fn as_fact(&self) -> Option<&Arc<Fact>> {
        match self {
            SchemaEntity::Fact(fact) => Some(fact),
            _ => None,
        }
    }

    pub fn table_ref(&self) -> TableRef {
        let table = TableRef::new(self.table_name());
        if self.alias() == self.table_name() {
            table
        } else {
            table.with_alias(self.alias())
        }
    }
}

impl PartialEq for SchemaEntity {
    /// Two entities are the same table in a query when they share an alias.
    fn eq(&self, other: &Self) -> bool {
        self.alias() == other.alias() && self.table_name() == other.table_name()
    }
}

impl Eq for SchemaEntity {}
