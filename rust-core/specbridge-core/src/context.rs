// SPDX-License-Identifier: PMPL-1.0-or-later
//! Per-query translation context.
//!
//! [`QueryContext`] wraps the query being built. Handlers use it to obtain
//! stable entity aliases, add de-duplicated joins and bind parameters;
//! callers use [`QueryContext::match_spec`] to filter by a specification.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::condition::{Condition, FieldRef};
use crate::entity::{Entity, EntityType};
use crate::error::UnsupportedSpecificationError;
use crate::param::{ParamValue, Parameters};
use crate::query::{Direction, FromClause, JoinClause, JoinKind, OrderBy, Query};
use crate::registry::HandlerRegistry;
use crate::spec::Specification;

/// Single-owner builder for one logical query.
#[derive(Debug)]
pub struct QueryContext<'r> {
    registry: &'r HandlerRegistry,
    /// Aliases derived on demand for entities without a FROM binding.
    aliases: BTreeMap<EntityType, String>,
    query: Query,
}

impl<'r> QueryContext<'r> {
    pub fn new(registry: &'r HandlerRegistry) -> Self {
        Self {
            registry,
            aliases: BTreeMap::new(),
            query: Query::default(),
        }
    }

    pub fn registry(&self) -> &'r HandlerRegistry {
        self.registry
    }

    /// Stable alias for `entity`.
    ///
    /// A FROM binding wins. Otherwise an alias is derived once from the
    /// entity's short name and the number of aliases derived so far
    /// (`shop::Product` becomes `product0`) and reused for the rest of
    /// this context's life.
    ///
    /// Call [`Self::from`] before translating: a FROM added for an entity
    /// that already has a derived alias takes over, while conditions built
    /// earlier keep referencing the derived one.
    pub fn alias_for(&mut self, entity: impl Into<EntityType>) -> String {
        let entity = entity.into();

        if let Some(alias) = self.query.root_alias_for(&entity) {
            return alias.to_string();
        }
        if let Some(alias) = self.aliases.get(&entity) {
            return alias.clone();
        }

        let base = entity.short_name().to_lowercase();
        let mut ordinal = self.aliases.len();
        let mut alias = format!("{}{}", base, ordinal);
        while self.query.alias_in_use(&alias) || self.aliases.values().any(|a| *a == alias) {
            ordinal += 1;
            alias = format!("{}{}", base, ordinal);
        }

        trace!(entity = %entity, alias = %alias, "Derived alias");
        self.aliases.insert(entity, alias.clone());
        alias
    }

    /// [`Self::alias_for`] keyed by a Rust entity type.
    pub fn alias_of<E: Entity>(&mut self) -> String {
        self.alias_for(EntityType::of::<E>())
    }

    /// Qualified reference to `field` of `entity`.
    pub fn field_of(&mut self, entity: impl Into<EntityType>, field: &str) -> FieldRef {
        FieldRef::new(self.alias_for(entity), field)
    }

    /// Replace the select list.
    pub fn select<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.select = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_select(&mut self, item: impl Into<String>) -> &mut Self {
        self.query.select.push(item.into());
        self
    }

    /// Bind `entity` as a query root under `alias`.
    pub fn from(&mut self, entity: impl Into<EntityType>, alias: impl Into<String>) -> &mut Self {
        self.query.from.push(FromClause {
            entity: entity.into(),
            alias: alias.into(),
        });
        self
    }

    /// Inner join `entity` as `alias`, unless a join already uses `alias`.
    pub fn join(
        &mut self,
        entity: impl Into<EntityType>,
        alias: impl Into<String>,
        condition: Option<Condition>,
    ) -> &mut Self {
        self.add_join(JoinKind::Inner, entity.into(), alias.into(), condition)
    }

    /// Left join `entity` as `alias`, unless a join already uses `alias`.
    pub fn left_join(
        &mut self,
        entity: impl Into<EntityType>,
        alias: impl Into<String>,
        condition: Option<Condition>,
    ) -> &mut Self {
        self.add_join(JoinKind::Left, entity.into(), alias.into(), condition)
    }

    fn add_join(
        &mut self,
        kind: JoinKind,
        entity: EntityType,
        alias: String,
        condition: Option<Condition>,
    ) -> &mut Self {
        if self.query.has_join_alias(&alias) {
            trace!(alias = %alias, "Join alias already present, skipping");
            return self;
        }
        self.query.joins.push(JoinClause {
            kind,
            entity,
            alias,
            condition,
        });
        self
    }

    /// AND `condition` into the accumulated filter.
    pub fn and_where(&mut self, condition: Condition) -> &mut Self {
        self.query.filter = Some(match self.query.filter.take() {
            Some(existing) => existing.and_also(condition),
            None => condition,
        });
        self
    }

    pub fn order_by(&mut self, field: FieldRef, direction: Direction) -> &mut Self {
        self.query.order_by.push(OrderBy { field, direction });
        self
    }

    /// Bind `value` under a unique name derived from `hint`; returns the
    /// name to reference as [`crate::Operand::Param`].
    pub fn bind_parameter(&mut self, hint: &str, value: impl Into<ParamValue>) -> String {
        self.query.parameters.bind(hint, value.into())
    }

    /// Set a parameter by exact name, replacing a previous value.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.query.parameters.set(name, value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.query.parameters.get(name)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.query.parameters
    }

    pub fn filter(&self) -> Option<&Condition> {
        self.query.filter.as_ref()
    }

    /// Translate `specification` through the registry without touching the
    /// filter. Composite handlers call this for their children.
    pub fn translate(
        &mut self,
        specification: &dyn Specification,
    ) -> Result<Condition, UnsupportedSpecificationError> {
        let registry = self.registry;
        let handler = registry.condition_handler_for(specification)?;
        handler.create_condition(specification, self)
    }

    /// Filter the query by `specification`, ANDed with earlier matches.
    ///
    /// On error the context is left exactly as it was before the call.
    pub fn match_spec(
        &mut self,
        specification: &dyn Specification,
    ) -> Result<&mut Self, UnsupportedSpecificationError> {
        debug!(
            specification = specification.spec_type().name(),
            "Matching specification"
        );

        let aliases = self.aliases.clone();
        let query = self.query.clone();

        match self.translate(specification) {
            Ok(condition) => Ok(self.and_where(condition)),
            Err(err) => {
                warn!(
                    specification = err.specification().name(),
                    error = %err,
                    "Specification translation failed"
                );
                self.aliases = aliases;
                self.query = query;
                Err(err)
            }
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Snapshot of the query built so far.
    pub fn build(&self) -> Query {
        self.query.clone()
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    pub fn to_query_string(&self) -> String {
        self.query.to_query_string()
    }
}
