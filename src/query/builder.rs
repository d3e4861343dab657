//! Query builder: accumulates references against a base table and assembles a plan.

use indexmap::IndexMap;
use tracing::debug;

use super::column::QueryColumn;
use super::error::{CompileError, CompileResult};
use super::parser::ReferenceParser;
use super::plan::QueryPlan;
use crate::config::CompilerSettings;
use crate::schema::{AbstractType, ColumnLike, Schema, SchemaEntity};
use crate::sql::expr::{max, table_col, Expr, ExprExt};
use crate::sql::query::{Join, OrderTerm, SelectItem, SortDir};
use crate::value::Value;

/// Single-threaded accumulator for one query.
///
/// `select`, `filter` and `order` are additive and may be called repeatedly;
/// joins are derived from column ownership as references are added.
#[derive(Debug)]
pub struct QueryBuilder<'s> {
    schema: &'s Schema,
    settings: CompilerSettings,
    base: SchemaEntity,
    selected: Vec<QueryColumn>,
    where_predicates: Vec<Expr>,
    having_predicates: Vec<Expr>,
    order: Vec<(QueryColumn, SortDir)>,
    limit: Option<u64>,
    /// Joined tables by alias, in the order they were first needed
    joins: IndexMap<String, Join>,
}

impl<'s> QueryBuilder<'s> {
    /// Start a query against the fact or dimension named `base`.
    pub fn new(schema: &'s Schema, base: &str) -> CompileResult<Self> {
        let base = schema
            .entity(base)
            .ok_or_else(|| CompileError::UnknownDimension(base.to_string()))?;

        Ok(Self {
            schema,
            settings: CompilerSettings::default(),
            base,
            selected: Vec::new(),
            where_predicates: Vec::new(),
            having_predicates: Vec::new(),
            order: Vec::new(),
            limit: None,
            joins: IndexMap::new(),
        })
    }

    pub fn with_settings(mut self, settings: CompilerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn base(&self) -> &SchemaEntity {
        &self.base
    }

    /// Columns selected so far, in selection order.
    pub fn columns(&self) -> &[QueryColumn] {
        &self.selected
    }

    fn parse(&self, reference: &str) -> CompileResult<Vec<QueryColumn>> {
        ReferenceParser::new(self.schema, Some(&self.base), &self.settings).parse(reference)
    }

    /// Add references to the SELECT list. Columns already selected are skipped.
    pub fn select(&mut self, references: &[&str]) -> CompileResult<&mut Self> {
        for reference in references {
            for column in self.parse(reference)? {
                if self.selected.iter().any(|c| c.alias() == column.alias()) {
                    continue;
                }
                self.join_owners(&column)?;
                self.selected.push(column);
            }
        }
        Ok(self)
    }

    /// Add `reference:value[,value...]` predicates.
    ///
    /// Aggregated columns filter after aggregation (HAVING), all others before (WHERE).
    pub fn filter(&mut self, predicates: &[&str]) -> CompileResult<&mut Self> {
        for predicate in predicates {
            let (reference, values) = predicate.split_once(':').ok_or_else(|| {
                CompileError::InvalidFilter(format!("{:?} has no ':' before its values", predicate))
            })?;

            let column = match self.parse(reference)?.as_slice() {
                [column] => column.clone(),
                _ => {
                    return Err(CompileError::InvalidFilter(format!(
                        "{:?} does not resolve to a single column",
                        reference
                    )))
                }
            };

            let values = values
                .split(',')
                .map(|v| coerce(v.trim(), column.abstract_type(), predicate))
                .collect::<CompileResult<Vec<_>>>()?;

            let target = column.select_expr();
            let condition = match values.as_slice() {
                [value] => target.eq(value.to_expr()),
                _ => target.in_list(values.iter().map(Value::to_expr).collect()),
            };

            self.join_owners(&column)?;
            if column.is_aggregate() {
                self.having_predicates.push(condition);
            } else {
                self.where_predicates.push(condition);
            }
        }
        Ok(self)
    }

    /// Add sort terms; a leading `-` sorts descending.
    pub fn order(&mut self, references: &[&str]) -> CompileResult<&mut Self> {
        for reference in references {
            let (reference, dir) = match reference.trim().strip_prefix('-') {
                Some(rest) => (rest, SortDir::Desc),
                None => (reference.trim(), SortDir::Asc),
            };
            for column in self.parse(reference)? {
                self.join_owners(&column)?;
                self.order.push((column, dir));
            }
        }
        Ok(self)
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Join every table `column` needs that is not the base and not yet joined.
    fn join_owners(&mut self, column: &QueryColumn) -> CompileResult<()> {
        for owner in column.owners() {
            if *owner == self.base || self.joins.contains_key(owner.alias()) {
                continue;
            }
            let join = self.join_for(owner)?;
            debug!(
                table = owner.table_name(),
                alias = owner.alias(),
                "adding join"
            );
            self.joins.insert(owner.alias().to_string(), join);
        }
        Ok(())
    }

    /// `INNER JOIN dim AS alias ON alias.<surrogate key> = base.<foreign key>`
    fn join_for(&self, owner: &SchemaEntity) -> CompileResult<Join> {
        let unrelated = || CompileError::UnrelatedTable {
            table: owner.alias().to_string(),
            base: self.base.alias().to_string(),
        };

        let fact = self.base.as_fact().ok_or_else(unrelated)?;
        let reference = match owner {
            SchemaEntity::Reference(reference) => fact
                .dimension_reference(reference.alias())
                .filter(|r| r.dimension().name() == reference.dimension().name()),
            SchemaEntity::Dimension(dimension) => fact.dimension_reference(dimension.name()),
            SchemaEntity::Fact(_) => None,
        }
        .ok_or_else(unrelated)?;

        let on = table_col(owner.alias(), &self.settings.surrogate_key)
            .eq(table_col(self.base.alias(), &reference.foreign_key()));

        Ok(Join {
            table: owner.table_ref(),
            on,
        })
    }

    /// Selected columns that are grouped on, after dropping those another
    /// grouped column already determines.
    ///
    /// Walks the selection in order: a candidate determined by a kept column
    /// is dropped, and a candidate that determines kept columns replaces them.
    /// Of two mutually implying columns the first selected is kept.
    fn grouped_columns(&self) -> Vec<&QueryColumn> {
        let mut kept: Vec<&QueryColumn> = Vec::new();

        for candidate in self.selected.iter().filter(|c| c.group_expr().is_some()) {
            if let Some(by) = kept.iter().find(|k| determines(k, candidate)) {
                debug!(
                    column = %candidate.alias(),
                    implied_by = %by.alias(),
                    "dropping implied group by column"
                );
                continue;
            }
            kept.retain(|k| {
                let implied = determines(candidate, k);
                if implied {
                    debug!(
                        column = %k.alias(),
                        implied_by = %candidate.alias(),
                        "dropping implied group by column"
                    );
                }
                !implied
            });
            kept.push(candidate);
        }

        kept
    }

    /// Assemble the plan for everything accumulated so far.
    ///
    /// The query is grouped whenever a selected column has a group expression
    /// or any aggregate appears in SELECT, HAVING or ORDER BY. In a grouped
    /// query every selected column must then be grouped or aggregated.
    pub fn plan(&self) -> CompileResult<QueryPlan> {
        if self.selected.is_empty() {
            return Err(CompileError::InvalidReference(
                "no columns selected".to_string(),
            ));
        }

        let grouped = !self.having_predicates.is_empty()
            || self
                .selected
                .iter()
                .any(|c| c.group_expr().is_some() || c.is_aggregate())
            || self.order.iter().any(|(c, _)| c.is_aggregate());

        if grouped {
            if let Some(loose) = self
                .selected
                .iter()
                .find(|c| c.group_expr().is_none() && !c.is_aggregate())
            {
                return Err(CompileError::InvalidReference(format!(
                    "{} is neither grouped nor aggregated; apply an operator to it",
                    loose.alias()
                )));
            }
        }

        let kept = if grouped {
            self.grouped_columns()
        } else {
            Vec::new()
        };

        let mut group_by: Vec<Expr> = Vec::new();
        for column in &kept {
            // Dimensions group on their key and the identifier they display
            for expr in column.group_expr().into_iter().chain([column.select_expr()]) {
                if !group_by.contains(&expr) {
                    group_by.push(expr);
                }
            }
        }

        let select: Vec<SelectItem> = self
            .selected
            .iter()
            .map(|column| {
                let mut expr = column.select_expr();
                // Implied columns are functionally determined by a grouped one
                if grouped
                    && column.group_expr().is_some()
                    && !kept.iter().any(|k| k.alias() == column.alias())
                {
                    expr = max(expr);
                }
                SelectItem::new(expr, column.alias())
            })
            .collect();

        let mut order_by = Vec::with_capacity(self.order.len());
        for (column, dir) in &self.order {
            let alias = column.alias();
            let expr = match self.selected.iter().position(|c| c.alias() == alias) {
                Some(index) => select[index].expr.clone(),
                None if grouped && !column.is_aggregate() => {
                    return Err(CompileError::InvalidReference(format!(
                        "cannot order on {} without selecting it in a grouped query",
                        alias
                    )))
                }
                None => column.order_expr(),
            };
            order_by.push(OrderTerm::new(expr, *dir));
        }

        let plan = QueryPlan {
            from: self.base.table_ref(),
            select,
            joins: self.joins.values().cloned().collect(),
            where_clause: conjunction(&self.where_predicates),
            group_by,
            having: conjunction(&self.having_predicates),
            order_by,
            limit: self.limit,
            columns: self.selected.clone(),
        };

        debug!(
            base = self.base.alias(),
            columns = plan.columns.len(),
            joins = plan.joins.len(),
            group_by = plan.group_by.len(),
            "assembled query plan"
        );

        Ok(plan)
    }
}

/// Whether grouping on `a` makes grouping on `b` redundant.
fn determines(a: &QueryColumn, b: &QueryColumn) -> bool {
    match (a.owner(), b.owner(), a.schema_name(), b.schema_name()) {
        (Some(owner), Some(other), Some(a), Some(b)) if owner == other => {
            owner.hierarchy().determines(a, b)
        }
        _ => false,
    }
}

fn conjunction(predicates: &[Expr]) -> Option<Expr> {
    predicates
        .iter()
        .cloned()
        .reduce(|acc, predicate| acc.and(predicate))
}

/// Parse a filter value according to the column type.
fn coerce(raw: &str, abstract_type: AbstractType, predicate: &str) -> CompileResult<Value> {
    let invalid = || {
        CompileError::InvalidFilter(format!(
            "{:?} in {:?} is not a valid {:?} value",
            raw, predicate, abstract_type
        ))
    };

    if raw.is_empty() {
        return Err(invalid());
    }

    match abstract_type {
        AbstractType::Integer | AbstractType::Year => {
            raw.parse::<i64>().map(Value::Int).map_err(|_| invalid())
        }
        AbstractType::Decimal | AbstractType::Float | AbstractType::Money | AbstractType::Percent => {
            match raw.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(invalid()),
            }
        }
        AbstractType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" => Ok(Value::Bool(true)),
            "false" | "f" | "0" | "no" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        _ => Ok(Value::Text(raw.to_string())),
    }
}
