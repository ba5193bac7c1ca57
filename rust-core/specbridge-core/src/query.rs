// SPDX-License-Identifier: PMPL-1.0-or-later
//! Materialized query representation.
//!
//! A [`Query`] is what a [`crate::QueryContext`] accumulates: the clauses,
//! the composed filter and the bound parameters. It is handed to the
//! execution collaborator as-is, or rendered with [`Query::to_query_string`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, FieldRef};
use crate::entity::EntityType;
use crate::param::Parameters;

/// Root entity bound to an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromClause {
    pub entity: EntityType,
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    Left,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Left => write!(f, "LEFT JOIN"),
        }
    }
}

/// Joined entity; the alias is unique among a query's joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub entity: EntityType,
    pub alias: String,
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "ASC"),
            Direction::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: FieldRef,
    pub direction: Direction,
}

/// SELECT query over aliased entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Selected items: an alias (whole entity) or `alias.field`.
    pub select: Vec<String>,
    pub from: Vec<FromClause>,
    pub joins: Vec<JoinClause>,
    /// Conjunction of every matched condition.
    pub filter: Option<Condition>,
    pub order_by: Vec<OrderBy>,
    pub parameters: Parameters,
}

impl Query {
    /// Alias bound to `entity` by a FROM clause.
    pub fn root_alias_for(&self, entity: &EntityType) -> Option<&str> {
        self.from
            .iter()
            .find(|clause| &clause.entity == entity)
            .map(|clause| clause.alias.as_str())
    }

    pub fn has_join_alias(&self, alias: &str) -> bool {
        self.joins.iter().any(|join| join.alias == alias)
    }

    /// Whether any clause (FROM or JOIN) already uses `alias`.
    pub fn alias_in_use(&self, alias: &str) -> bool {
        self.from.iter().any(|clause| clause.alias == alias) || self.has_join_alias(alias)
    }

    /// Render as query text, e.g.
    /// `SELECT p FROM shop::Product p INNER JOIN shop::Category c ON c.id = p.category WHERE p.article = :article_0`.
    pub fn to_query_string(&self) -> String {
        let mut out = String::from("SELECT");

        if !self.select.is_empty() {
            out.push(' ');
            out.push_str(&self.select.join(", "));
        }

        if !self.from.is_empty() {
            let roots: Vec<String> = self
                .from
                .iter()
                .map(|clause| format!("{} {}", clause.entity, clause.alias))
                .collect();
            out.push_str(" FROM ");
            out.push_str(&roots.join(", "));
        }

        for join in &self.joins {
            out.push_str(&format!(" {} {} {}", join.kind, join.entity, join.alias));
            if let Some(condition) = &join.condition {
                out.push_str(" ON ");
                out.push_str(&condition.to_clause_string());
            }
        }

        if let Some(filter) = &self.filter {
            out.push_str(" WHERE ");
            out.push_str(&filter.to_clause_string());
        }

        if !self.order_by.is_empty() {
            let orders: Vec<String> = self
                .order_by
                .iter()
                .map(|order| format!("{} {}", order.field, order.direction))
                .collect();
            out.push_str(" ORDER BY ");
            out.push_str(&orders.join(", "));
        }

        out
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}
