// SPDX-License-Identifier: PMPL-1.0-or-later
//! Generic field comparison leaf.
//!
//! `FieldCompare` covers the common "entity field OP literal" predicate so
//! integrations only write dedicated leaves for domain-specific criteria.

use serde::Serialize;

use crate::condition::{is_identifier, CompareOp, Condition, Operand};
use crate::context::QueryContext;
use crate::entity::EntityType;
use crate::error::{SpecificationError, UnsupportedSpecificationError};
use crate::handler::{downcast_spec, ConditionHandler, Handler};
use crate::param::{compare_values, ParamValue};
use crate::spec::{SpecType, Specification};

/// `entity.field <op> value`.
///
/// The field is rendered into condition text and also names the bound
/// parameter, so it must be an identifier (see [`is_identifier`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCompare {
    entity: EntityType,
    field: String,
    op: CompareOp,
    value: ParamValue,
}

impl FieldCompare {
    pub fn new(
        entity: impl Into<EntityType>,
        field: impl Into<String>,
        op: CompareOp,
        value: impl Into<ParamValue>,
    ) -> Result<Self, SpecificationError> {
        let field = field.into();
        if !is_identifier(&field) {
            return Err(SpecificationError::InvalidIdentifier(field));
        }
        Ok(Self {
            entity: entity.into(),
            field,
            op,
            value: value.into(),
        })
    }

    pub fn equals(
        entity: impl Into<EntityType>,
        field: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Result<Self, SpecificationError> {
        Self::new(entity, field, CompareOp::Eq, value)
    }

    pub fn entity(&self) -> &EntityType {
        &self.entity
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }
}

impl Specification for FieldCompare {
    /// Candidates are JSON objects keyed by field name.
    fn is_satisfied_by(&self, candidate: &dyn std::any::Any) -> bool {
        let Some(row) = candidate.downcast_ref::<serde_json::Value>() else {
            return false;
        };
        let Some(actual) = row.get(&self.field) else {
            return false;
        };
        self.op.holds(compare_values(actual, &self.value.to_json()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCompareHandler;

impl Handler for FieldCompareHandler {
    fn specification_type(&self) -> SpecType {
        SpecType::of::<FieldCompare>()
    }

    fn as_condition_handler(&self) -> Option<&dyn ConditionHandler> {
        Some(self)
    }
}

impl ConditionHandler for FieldCompareHandler {
    fn create_condition(
        &self,
        specification: &dyn Specification,
        context: &mut QueryContext<'_>,
    ) -> Result<Condition, UnsupportedSpecificationError> {
        let spec = downcast_spec::<FieldCompare>(specification, self.name())?;
        let field = context.field_of(spec.entity(), spec.field());
        let param = context.bind_parameter(spec.field(), spec.value().clone());
        Ok(Condition::compare(Operand::Field(field), spec.op(), Operand::param(param)))
    }
}
