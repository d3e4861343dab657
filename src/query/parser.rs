//! Dotted-path reference parser.
//!
//! Turns reference strings into resolved [`QueryColumn`]s:
//!
//! ```text
//! product                       -> the product dimension (main identifier)
//! product.manufacturer          -> a dimension attribute
//! sales.total                   -> a measure
//! sales.order_date.year         -> an attribute of a role-played dimension
//! sum.sales.total               -> aggregate, leading operator
//! sales.total.sum               -> aggregate, trailing operator
//! count.product / product.count -> distinct count of dimension members
//! sum.sales.total~product.category
//!                               -> one summed cell per category value
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::aggregate::AggregateOp;
use super::column::QueryColumn;
use super::error::{CompileError, CompileResult};
use crate::config::CompilerSettings;
use crate::schema::{
    AbstractType, ColumnLike, Dimension, Schema, SchemaColumn, SchemaEntity,
};
use crate::value::Value;

static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Resolves reference strings against a schema, relative to an optional base table.
pub struct ReferenceParser<'s> {
    schema: &'s Schema,
    base: Option<&'s SchemaEntity>,
    settings: &'s CompilerSettings,
}

impl<'s> ReferenceParser<'s> {
    pub fn new(
        schema: &'s Schema,
        base: Option<&'s SchemaEntity>,
        settings: &'s CompilerSettings,
    ) -> Self {
        Self {
            schema,
            base,
            settings,
        }
    }

    /// Resolve one reference. Yields a single column unless the reference pivots.
    pub fn parse(&self, reference: &str) -> CompileResult<Vec<QueryColumn>> {
        trace!(reference, "parsing reference");

        let parts: Vec<&str> = reference.split('~').map(str::trim).collect();
        match parts.as_slice() {
            [single] => {
                let (column, op) = self.resolve(single)?;
                Ok(vec![self.apply(column, op)?])
            }
            [value, pivot] => self.parse_pivot(value, pivot),
            _ => Err(CompileError::InvalidReference(format!(
                "{} pivots more than once",
                reference
            ))),
        }
    }

    fn parse_pivot(&self, value: &str, pivot: &str) -> CompileResult<Vec<QueryColumn>> {
        let (value, op) = self.resolve(value)?;
        let (pivot, pivot_op) = self.resolve(pivot)?;

        if pivot_op.is_some() || pivot.is_aggregate() {
            return Err(CompileError::InvalidReference(format!(
                "cannot pivot on aggregate {}",
                pivot.alias()
            )));
        }
        if value.is_aggregate() {
            return Err(CompileError::InvalidReference(format!(
                "cannot pivot aggregate {}; apply the operator to the pivoted reference",
                value.alias()
            )));
        }

        let domain = self.pivot_domain(&pivot)?;
        trace!(pivot = %pivot.alias(), cells = domain.len(), "expanding pivot");

        domain
            .into_iter()
            .enumerate()
            .map(|(index, pivot_value)| {
                let cell = QueryColumn::Pivoted {
                    value: Box::new(value.clone()),
                    pivot: Box::new(pivot.clone()),
                    index,
                    pivot_value,
                };
                self.apply(cell, op)
            })
            .collect()
    }

    /// Resolve a dotted path into a column plus the operator it carries, if any.
    fn resolve(&self, path: &str) -> CompileResult<(QueryColumn, Option<AggregateOp>)> {
        let mut segments: Vec<&str> = path.split('.').map(str::trim).collect();
        if let Some(bad) = segments.iter().find(|s| !SEGMENT.is_match(s)) {
            return Err(CompileError::InvalidReference(format!(
                "{:?} is not a valid segment of {:?}",
                bad, path
            )));
        }

        let mut op = None;
        if segments.len() > 1 && !self.is_table(segments[0]) {
            if let Some(leading) = AggregateOp::from_keyword(segments[0]) {
                op = Some(leading);
                segments.remove(0);
            }
        }

        let mut owner = self.resolve_table(segments[0])?;
        let mut rest = &segments[1..];

        let reference = match (&owner, rest.first()) {
            (SchemaEntity::Fact(fact), Some(next)) => fact.dimension_reference(next).cloned(),
            _ => None,
        };
        if let Some(reference) = reference {
            trace!(alias = reference.alias(), "following dimension reference");
            owner = SchemaEntity::Reference(reference);
            rest = &rest[1..];
        }

        let column = match rest.split_first() {
            None => self.dimension_column(owner)?,
            Some((next, tail)) => match self.owner_column(&owner, next) {
                Some(column) => {
                    match tail {
                        [] => {}
                        [trailing] => match AggregateOp::from_keyword(trailing) {
                            Some(trailing) => op = merge_ops(op, trailing, path)?,
                            None => {
                                return Err(CompileError::InvalidReference(format!(
                                    "unexpected segment {:?} in {:?}",
                                    trailing, path
                                )))
                            }
                        },
                        _ => {
                            return Err(CompileError::InvalidReference(format!(
                                "too many segments in {:?}",
                                path
                            )))
                        }
                    }
                    self.column(owner, column)
                }
                // `product.count`: any operator straight after a dimension counts its members
                None => match (AggregateOp::from_keyword(next), tail) {
                    (Some(_), []) => {
                        op = merge_ops(op, AggregateOp::Count, path)?;
                        self.dimension_column(owner)?
                    }
                    _ => {
                        return Err(CompileError::UnknownColumn {
                            table: owner.alias().to_string(),
                            column: next.to_string(),
                        })
                    }
                },
            },
        };

        trace!(path, alias = %column.alias(), ?op, "resolved reference");
        Ok((column, op))
    }

    fn is_table(&self, name: &str) -> bool {
        self.resolve_table(name).is_ok()
    }

    /// First path segment: the base table, one of the base fact's references, or any table.
    fn resolve_table(&self, name: &str) -> CompileResult<SchemaEntity> {
        if let Some(base) = self.base {
            if base.alias() == name {
                return Ok(base.clone());
            }
            if let Some(reference) = base.as_fact().and_then(|f| f.dimension_reference(name)) {
                return Ok(SchemaEntity::Reference(reference.clone()));
            }
        }

        self.schema
            .entity(name)
            .ok_or_else(|| CompileError::UnknownDimension(name.to_string()))
    }

    fn owner_column(&self, owner: &SchemaEntity, name: &str) -> Option<SchemaColumn> {
        match owner {
            SchemaEntity::Fact(fact) => fact
                .get_column(name)
                .and_then(|c| c.as_column())
                .cloned(),
            SchemaEntity::Dimension(_) | SchemaEntity::Reference(_) => owner
                .as_dimension()
                .and_then(|d| d.get_column(name))
                .cloned(),
        }
    }

    fn dimension_column(&self, owner: SchemaEntity) -> CompileResult<QueryColumn> {
        let Some(dimension) = owner.as_dimension() else {
            return Err(CompileError::InvalidReference(format!(
                "{} is a fact; reference one of its columns",
                owner.alias()
            )));
        };
        let identifier = dimension.main_identifier().map(str::to_string);
        let key = self.key_of(dimension);
        Ok(QueryColumn::Dimension {
            owner,
            identifier,
            key,
        })
    }

    /// Grouping/counting key: the original key, else the surrogate key.
    fn key_of(&self, dimension: &Dimension) -> String {
        dimension
            .original_key()
            .unwrap_or(&self.settings.surrogate_key)
            .to_string()
    }

    fn column(&self, owner: SchemaEntity, column: SchemaColumn) -> QueryColumn {
        let identifier_key = owner
            .as_dimension()
            .filter(|d| d.is_identifiable() && d.is_identifier(column.name()))
            .map(|d| self.key_of(d));

        if let Some(key) = identifier_key {
            QueryColumn::Identifier { owner, column, key }
        } else if column.is_virtual() {
            QueryColumn::Calculated { owner, column }
        } else {
            QueryColumn::Qualified { owner, column }
        }
    }

    /// Wrap `column` in `op`, checking the operator suits it.
    fn apply(&self, column: QueryColumn, op: Option<AggregateOp>) -> CompileResult<QueryColumn> {
        let Some(op) = op else {
            return Ok(column);
        };

        if column.is_aggregate() {
            return Err(CompileError::AmbiguousAggregation {
                op: op.to_string(),
                column: column.alias(),
                reason: "column is already aggregated".to_string(),
            });
        }

        let (abstract_type, semi_additive, countable) = aggregation_traits(&column);
        if let Some(reason) = op.rejection(abstract_type, semi_additive, countable) {
            return Err(CompileError::AmbiguousAggregation {
                op: op.to_string(),
                column: column.alias(),
                reason: reason.to_string(),
            });
        }

        Ok(column.aggregate(op))
    }

    /// Every value the pivot column can take, in declaration or ascending order.
    fn pivot_domain(&self, pivot: &QueryColumn) -> CompileResult<Vec<Value>> {
        let unsupported = |reason: &str| CompileError::UnsupportedPivotDomain {
            column: pivot.alias(),
            reason: reason.to_string(),
        };

        let column = match pivot {
            QueryColumn::Dimension {
                owner, identifier, ..
            } => identifier
                .as_deref()
                .and_then(|id| owner.as_dimension()?.get_column(id)),
            other => other.schema_column(),
        }
        .ok_or_else(|| unsupported("no enumerable column"))?;

        if let Some(elements) = column.elements() {
            return Ok(elements.to_vec());
        }

        if column.abstract_type() == AbstractType::Boolean {
            return Ok(vec![Value::Bool(true), Value::Bool(false)]);
        }

        if !column.abstract_type().is_integral() {
            return Err(unsupported("column declares no elements"));
        }

        match (column.min(), column.max()) {
            (Some(min), Some(max)) if min <= max => {
                let span = i128::from(max) - i128::from(min);
                if span > i128::from(self.settings.max_pivot_span) {
                    return Err(unsupported(&format!(
                        "range {}..={} exceeds {} values",
                        min, max, self.settings.max_pivot_span
                    )));
                }
                Ok((min..=max).map(Value::Int).collect())
            }
            (Some(_), Some(_)) => Err(unsupported("lower bound exceeds upper bound")),
            _ => Err(unsupported("integer range is unbounded")),
        }
    }
}

fn merge_ops(
    leading: Option<AggregateOp>,
    trailing: AggregateOp,
    path: &str,
) -> CompileResult<Option<AggregateOp>> {
    match leading {
        Some(_) => Err(CompileError::InvalidReference(format!(
            "{:?} carries more than one operator",
            path
        ))),
        None => Ok(Some(trailing)),
    }
}

/// (type, semi-additive, countable) of the values an operator would see.
fn aggregation_traits(target: &QueryColumn) -> (AbstractType, bool, bool) {
    match target {
        QueryColumn::Dimension { .. } | QueryColumn::Identifier { .. } => {
            (target.abstract_type(), false, true)
        }
        QueryColumn::Qualified { column, .. } | QueryColumn::Calculated { column, .. } => (
            column.abstract_type(),
            column.is_semi_additive(),
            column.is_countable(),
        ),
        QueryColumn::Pivoted { value, .. } => aggregation_traits(value),
        QueryColumn::Aggregate { .. } => (target.abstract_type(), false, false),
    }
}
