// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Nested-loop evaluation of a materialized `Query`.
//
// Execution order: FROM roots (cartesian product), JOINs, WHERE filter,
// ORDER BY, result limit, SELECT projection. Comparisons use
// `compare_values`, so a NULL or type-mismatched comparison is false and
// its negation is true.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use specbridge_core::{
    compare_values, Condition, Direction, EntityType, FieldRef, JoinKind, Operand, Parameters, Query,
};
use tracing::debug;

use crate::backend::StorageBackend;
use crate::config::ExecutorConfig;
use crate::entity_store::EntityStore;
use crate::error::{ExecutionError, StorageError};

/// Alias to row; a LEFT JOIN without a match binds `Value::Null`.
type Binding = BTreeMap<String, Value>;

/// One projected result row, columns in select order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, Value)>,
}

impl ResultRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Decode `column` into `T`; `Ok(None)` when the column is absent.
    pub fn get_as<T: DeserializeOwned>(&self, column: &str) -> Result<Option<T>, StorageError> {
        self.get(column)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|err| {
                    StorageError::SerializationError(format!("column '{}': {}", column, err))
                })
            })
            .transpose()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Evaluates queries built by a `QueryContext` against an [`EntityStore`].
///
/// # Example
///
/// ```rust
/// use specbridge_core::{FieldCompare, FieldCompareHandler, HandlerRegistry, RegistryConfig};
/// use specbridge_store::{EntityStore, Executor, ExecutorConfig, InMemoryBackend};
///
/// # tokio_test::block_on(async {
/// let store = EntityStore::new(InMemoryBackend::new());
/// store.insert_row("Product", serde_json::json!({"article": "A1"})).await.unwrap();
/// store.insert_row("Product", serde_json::json!({"article": "A2"})).await.unwrap();
///
/// let mut builder = HandlerRegistry::builder(RegistryConfig::default());
/// builder.register(FieldCompareHandler).unwrap();
/// let registry = builder.build();
///
/// let mut ctx = registry.create_context();
/// ctx.select(["p"]).from("Product", "p");
/// ctx.match_spec(&FieldCompare::equals("Product", "article", "A2").unwrap()).unwrap();
///
/// let rows = Executor::new(store, ExecutorConfig::default())
///     .execute(ctx.query())
///     .await
///     .unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].get("p").unwrap()["article"], "A2");
/// # });
/// ```
pub struct Executor<B: StorageBackend + Clone> {
    store: EntityStore<B>,
    config: ExecutorConfig,
}

impl<B: StorageBackend + Clone> Executor<B> {
    pub fn new(store: EntityStore<B>, config: ExecutorConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &EntityStore<B> {
        &self.store
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `query` and project its rows in select order.
    ///
    /// Fails on a query without FROM, on aliases or parameters the query
    /// references but never binds, and when an entity holds more rows than
    /// [`ExecutorConfig::max_rows_per_entity`].
    pub async fn execute(&self, query: &Query) -> Result<Vec<ResultRow>, ExecutionError> {
        if query.from.is_empty() {
            return Err(ExecutionError::NoRoot);
        }
        debug!(query = %query, "Executing query");

        let mut bindings: Vec<Binding> = vec![Binding::new()];
        for root in &query.from {
            let rows = self.load(&root.entity).await?;
            bindings = bindings
                .into_iter()
                .flat_map(|binding| {
                    rows.iter().map(move |row| {
                        let mut next = binding.clone();
                        next.insert(root.alias.clone(), row.clone());
                        next
                    })
                })
                .collect();
        }

        for join in &query.joins {
            let rows = self.load(&join.entity).await?;
            let mut joined = Vec::new();
            for binding in bindings {
                let mut matched = false;
                for row in &rows {
                    let mut candidate = binding.clone();
                    candidate.insert(join.alias.clone(), row.clone());
                    let keep = match &join.condition {
                        Some(condition) => evaluate(condition, &candidate, &query.parameters)?,
                        None => true,
                    };
                    if keep {
                        matched = true;
                        joined.push(candidate);
                    }
                }
                if !matched && join.kind == JoinKind::Left {
                    let mut candidate = binding;
                    candidate.insert(join.alias.clone(), Value::Null);
                    joined.push(candidate);
                }
            }
            bindings = joined;
        }

        if let Some(filter) = &query.filter {
            let mut kept = Vec::with_capacity(bindings.len());
            for binding in bindings {
                if evaluate(filter, &binding, &query.parameters)? {
                    kept.push(binding);
                }
            }
            bindings = kept;
        }

        if !query.order_by.is_empty() {
            let mut keyed = Vec::with_capacity(bindings.len());
            for binding in bindings {
                let keys = query
                    .order_by
                    .iter()
                    .map(|order| resolve_field(&order.field, &binding))
                    .collect::<Result<Vec<_>, _>>()?;
                keyed.push((keys, binding));
            }
            keyed.sort_by(|(a, _), (b, _)| {
                for ((left, right), order) in a.iter().zip(b).zip(&query.order_by) {
                    let ordering = sort_order(left, right);
                    let ordering = match order.direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
            bindings = keyed.into_iter().map(|(_, binding)| binding).collect();
        }

        if let Some(limit) = self.config.max_result_rows {
            bindings.truncate(limit);
        }

        let rows = bindings
            .iter()
            .map(|binding| project(&query.select, binding))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rows = rows.len(), "Query executed");
        Ok(rows)
    }

    /// Every row of `entity`. Fails rather than evaluating a truncated scan.
    async fn load(&self, entity: &EntityType) -> Result<Vec<Value>, ExecutionError> {
        let max = self.config.max_rows_per_entity;
        let rows = self.store.rows(entity, max.saturating_add(1)).await?;
        if rows.len() > max {
            return Err(ExecutionError::RowLimitExceeded {
                entity: entity.to_string(),
                max,
            });
        }
        Ok(rows)
    }
}

fn resolve_field(field: &FieldRef, binding: &Binding) -> Result<Value, ExecutionError> {
    let row = binding
        .get(&field.alias)
        .ok_or_else(|| ExecutionError::UnknownAlias(field.alias.clone()))?;
    Ok(row.get(&field.field).cloned().unwrap_or(Value::Null))
}

fn resolve(operand: &Operand, binding: &Binding, params: &Parameters) -> Result<Value, ExecutionError> {
    match operand {
        Operand::Field(field) => resolve_field(field, binding),
        Operand::Param(name) => params
            .get(name)
            .map(|value| value.to_json())
            .ok_or_else(|| ExecutionError::UnknownParameter(name.clone())),
    }
}

fn evaluate(condition: &Condition, binding: &Binding, params: &Parameters) -> Result<bool, ExecutionError> {
    match condition {
        Condition::True => Ok(true),
        Condition::Compare { left, op, right } => {
            let left = resolve(left, binding, params)?;
            let right = resolve(right, binding, params)?;
            Ok(op.holds(compare_values(&left, &right)))
        }
        Condition::And(parts) => {
            for part in parts {
                if !evaluate(part, binding, params)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Or(parts) => {
            for part in parts {
                if evaluate(part, binding, params)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Not(inner) => Ok(!evaluate(inner, binding, params)?),
    }
}

/// NULLs sort first; incomparable values keep their relative order.
fn sort_order(left: &Value, right: &Value) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_values(left, right).unwrap_or(Ordering::Equal),
    }
}

/// Empty select projects every bound alias.
fn project(select: &[String], binding: &Binding) -> Result<ResultRow, ExecutionError> {
    if select.is_empty() {
        return Ok(ResultRow {
            columns: binding.iter().map(|(alias, row)| (alias.clone(), row.clone())).collect(),
        });
    }

    let columns = select
        .iter()
        .map(|item| {
            let value = match item.split_once('.') {
                None => binding
                    .get(item)
                    .cloned()
                    .ok_or_else(|| ExecutionError::UnknownAlias(item.clone()))?,
                Some((alias, field)) if !alias.is_empty() && !field.is_empty() && !field.contains('.') => {
                    resolve_field(&FieldRef::new(alias, field), binding)?
                }
                Some(_) => return Err(ExecutionError::UnsupportedSelect(item.clone())),
            };
            Ok((item.clone(), value))
        })
        .collect::<Result<Vec<_>, ExecutionError>>()?;
    Ok(ResultRow { columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use serde_json::json;
    use specbridge_core::{CompareOp, FromClause, JoinClause, OrderBy, ParamValue};

    async fn executor(config: ExecutorConfig) -> Executor<InMemoryBackend> {
        let store = EntityStore::new(InMemoryBackend::new());
        for (article, price, category) in [("A1", 10, 1), ("A2", 5, 2), ("A3", 7, 9)] {
            store
                .insert_row(
                    "Product",
                    json!({ "article": article, "price": price, "category": category }),
                )
                .await
                .unwrap();
        }
        for (id, name) in [(1, "tools"), (2, "toys")] {
            store
                .insert_row("Category", json!({ "id": id, "name": name }))
                .await
                .unwrap();
        }
        Executor::new(store, config)
    }

    fn products() -> Query {
        Query {
            select: vec!["p.article".to_string()],
            from: vec![FromClause {
                entity: EntityType::new("Product"),
                alias: "p".to_string(),
            }],
            ..Query::default()
        }
    }

    fn join_category(query: &mut Query, kind: JoinKind, on: Condition) {
        query.joins.push(JoinClause {
            kind,
            entity: EntityType::new("Category"),
            alias: "c".to_string(),
            condition: Some(on),
        });
    }

    fn articles(rows: &[ResultRow]) -> Vec<String> {
        rows.iter()
            .map(|row| row.get_as::<String>("p.article").unwrap().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_filter_with_parameter() {
        let executor = executor(ExecutorConfig::default()).await;
        let mut query = products();
        query.filter = Some(Condition::compare(
            Operand::field("p", "price"),
            CompareOp::Gt,
            Operand::param("price_0"),
        ));
        query.parameters.set("price_0", ParamValue::Int(6));

        let rows = executor.execute(&query).await.unwrap();
        assert_eq!(articles(&rows), vec!["A1", "A3"]);
    }

    #[tokio::test]
    async fn test_inner_and_left_join() {
        let executor = executor(ExecutorConfig::default()).await;
        let on = Condition::equals(Operand::field("c", "id"), Operand::field("p", "category"));

        let mut query = products();
        join_category(&mut query, JoinKind::Inner, on.clone());
        let rows = executor.execute(&query).await.unwrap();
        assert_eq!(articles(&rows), vec!["A1", "A2"]);

        let mut query = products();
        join_category(&mut query, JoinKind::Left, on);
        query.select.push("c.name".to_string());
        let rows = executor.execute(&query).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].get("c.name"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_order_and_limit() {
        let executor = executor(ExecutorConfig::default().with_max_result_rows(2)).await;
        let mut query = products();
        query.order_by.push(OrderBy {
            field: FieldRef::new("p", "price"),
            direction: Direction::Asc,
        });
        let rows = executor.execute(&query).await.unwrap();
        assert_eq!(articles(&rows), vec!["A2", "A3"]);
    }

    #[tokio::test]
    async fn test_null_comparison_and_negation() {
        let executor = executor(ExecutorConfig::default()).await;
        let missing = Condition::equals(Operand::field("p", "colour"), Operand::param("colour_0"));
        let mut query = products();
        query.parameters.set("colour_0", ParamValue::from("red"));

        query.filter = Some(missing.clone());
        assert!(executor.execute(&query).await.unwrap().is_empty());

        query.filter = Some(Condition::negate(missing));
        assert_eq!(executor.execute(&query).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_execution_errors() {
        let executor = executor(ExecutorConfig::default()).await;
        assert!(matches!(
            executor.execute(&Query::default()).await,
            Err(ExecutionError::NoRoot)
        ));

        let mut query = products();
        query.filter = Some(Condition::equals(Operand::field("p", "article"), Operand::param("nope")));
        assert!(matches!(
            executor.execute(&query).await,
            Err(ExecutionError::UnknownParameter(name)) if name == "nope"
        ));

        let mut query = products();
        query.select = vec!["x".to_string()];
        assert!(matches!(
            executor.execute(&query).await,
            Err(ExecutionError::UnknownAlias(alias)) if alias == "x"
        ));

        let mut query = products();
        query.select = vec!["p.a.b".to_string()];
        assert!(matches!(
            executor.execute(&query).await,
            Err(ExecutionError::UnsupportedSelect(_))
        ));
    }

    #[tokio::test]
    async fn test_scan_past_row_limit_fails() {
        let config = ExecutorConfig {
            max_rows_per_entity: 2,
            ..ExecutorConfig::default()
        };
        let executor = executor(config).await;
        let mut query = products();
        query.filter = Some(Condition::equals(
            Operand::field("p", "article"),
            Operand::param("article_0"),
        ));
        query.parameters.set("article_0", ParamValue::from("A3"));

        let err = executor.execute(&query).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::RowLimitExceeded { ref entity, max: 2 } if entity == "Product"
        ));

        // Exactly at the limit is fine: two categories are stored
        let query = Query {
            select: vec!["k.name".to_string()],
            from: vec![FromClause {
                entity: EntityType::new("Category"),
                alias: "k".to_string(),
            }],
            ..Query::default()
        };
        assert_eq!(executor.execute(&query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_select_projects_all_aliases() {
        let executor = executor(ExecutorConfig::default()).await;
        let mut query = products();
        query.select.clear();
        let rows = executor.execute(&query).await.unwrap();
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0].get("p").unwrap()["article"], "A1");
    }
}
