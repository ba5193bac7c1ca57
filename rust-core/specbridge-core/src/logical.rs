// SPDX-License-Identifier: PMPL-1.0-or-later
//! Handlers for the logical combinators.
//!
//! The composite handlers hold no registry of their own: they recurse
//! through [`QueryContext::translate`], which resolves each child against
//! the registry the context was created from.

use crate::condition::Condition;
use crate::context::QueryContext;
use crate::error::UnsupportedSpecificationError;
use crate::handler::{downcast_spec, ConditionHandler, Handler};
use crate::spec::{AllOf, Any, AnyOf, Not, SpecType, Specification};

/// Translate `children` in order, stopping at the first failure and
/// recording `composite` on the error.
fn translate_children<'s>(
    composite: &'static str,
    children: impl Iterator<Item = &'s dyn Specification>,
    context: &mut QueryContext<'_>,
) -> Result<Vec<Condition>, UnsupportedSpecificationError> {
    children
        .map(|child| context.translate(child).map_err(|err| err.within(composite)))
        .collect()
}

/// Conjunction handler: `(a AND b AND ...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOfHandler;

impl Handler for AllOfHandler {
    fn specification_type(&self) -> SpecType {
        SpecType::of::<AllOf>()
    }

    fn as_condition_handler(&self) -> Option<&dyn ConditionHandler> {
        Some(self)
    }
}

impl ConditionHandler for AllOfHandler {
    fn create_condition(
        &self,
        specification: &dyn Specification,
        context: &mut QueryContext<'_>,
    ) -> Result<Condition, UnsupportedSpecificationError> {
        let all_of = downcast_spec::<AllOf>(specification, self.name())?;
        if all_of.is_empty() {
            return Err(UnsupportedSpecificationError::empty_composite(
                specification.spec_type(),
                self.name(),
            ));
        }
        let parts = translate_children(self.name(), all_of.children(), context)?;
        Ok(Condition::and(parts))
    }
}

/// Disjunction handler: `(a OR b OR ...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyOfHandler;

impl Handler for AnyOfHandler {
    fn specification_type(&self) -> SpecType {
        SpecType::of::<AnyOf>()
    }

    fn as_condition_handler(&self) -> Option<&dyn ConditionHandler> {
        Some(self)
    }
}

impl ConditionHandler for AnyOfHandler {
    fn create_condition(
        &self,
        specification: &dyn Specification,
        context: &mut QueryContext<'_>,
    ) -> Result<Condition, UnsupportedSpecificationError> {
        let any_of = downcast_spec::<AnyOf>(specification, self.name())?;
        if any_of.is_empty() {
            return Err(UnsupportedSpecificationError::empty_composite(
                specification.spec_type(),
                self.name(),
            ));
        }
        let parts = translate_children(self.name(), any_of.children(), context)?;
        Ok(Condition::or(parts))
    }
}

/// Negation handler: `NOT(a)`. Double negation is kept as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotHandler;

impl Handler for NotHandler {
    fn specification_type(&self) -> SpecType {
        SpecType::of::<Not>()
    }

    fn as_condition_handler(&self) -> Option<&dyn ConditionHandler> {
        Some(self)
    }
}

impl ConditionHandler for NotHandler {
    fn create_condition(
        &self,
        specification: &dyn Specification,
        context: &mut QueryContext<'_>,
    ) -> Result<Condition, UnsupportedSpecificationError> {
        let not = downcast_spec::<Not>(specification, self.name())?;
        let inner = context.translate(not.child())?;
        Ok(Condition::negate(inner))
    }
}

/// Tautology handler: `1 = 1`, with no alias or parameter side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyHandler;

impl Handler for AnyHandler {
    fn specification_type(&self) -> SpecType {
        SpecType::of::<Any>()
    }

    fn as_condition_handler(&self) -> Option<&dyn ConditionHandler> {
        Some(self)
    }
}

impl ConditionHandler for AnyHandler {
    fn create_condition(
        &self,
        specification: &dyn Specification,
        _context: &mut QueryContext<'_>,
    ) -> Result<Condition, UnsupportedSpecificationError> {
        downcast_spec::<Any>(specification, self.name())?;
        Ok(Condition::True)
    }
}
