// SPDX-License-Identifier: PMPL-1.0-or-later
//! Handler contracts.
//!
//! A [`Handler`] is bound to exactly one specification type. Handlers that
//! can compile into query conditions also implement [`ConditionHandler`] and
//! expose it through [`Handler::as_condition_handler`], which is how the
//! registry checks the [`Capability::Condition`] capability.

use std::fmt;

use crate::condition::Condition;
use crate::context::QueryContext;
use crate::error::UnsupportedSpecificationError;
use crate::spec::{SpecType, Specification};

/// Something a caller may require of a handler beyond its existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Produces backend-native conditions ([`ConditionHandler`]).
    Condition,
    /// An integration-defined capability declared through
    /// [`Handler::declared_capabilities`].
    Named(&'static str),
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Condition => f.write_str("condition"),
            Capability::Named(name) => f.write_str(name),
        }
    }
}

/// Translator bound to one specification type.
pub trait Handler: Send + Sync {
    /// The exact specification type this handler accepts.
    fn specification_type(&self) -> SpecType;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        crate::spec::short_type_name(std::any::type_name::<Self>())
    }

    fn as_condition_handler(&self) -> Option<&dyn ConditionHandler> {
        None
    }

    /// Named capabilities beyond [`Capability::Condition`].
    fn declared_capabilities(&self) -> &[Capability] {
        &[]
    }

    fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Condition => self.as_condition_handler().is_some(),
            named => self.declared_capabilities().contains(&named),
        }
    }
}

/// A handler that compiles its specification into a [`Condition`].
pub trait ConditionHandler: Handler {
    /// Translate `specification`, which must be of
    /// [`Handler::specification_type`], using `context` for aliases, joins
    /// and parameter binding.
    fn create_condition(
        &self,
        specification: &dyn Specification,
        context: &mut QueryContext<'_>,
    ) -> Result<Condition, UnsupportedSpecificationError>;
}

/// Downcast to the exact type a handler supports, or fail with
/// [`crate::UnsupportedReason::WrongVariant`] naming `handler`.
pub fn downcast_spec<'a, S: Specification>(
    specification: &'a dyn Specification,
    handler: &'static str,
) -> Result<&'a S, UnsupportedSpecificationError> {
    specification.as_any().downcast_ref::<S>().ok_or_else(|| {
        UnsupportedSpecificationError::wrong_variant(
            specification.spec_type(),
            handler,
            SpecType::of::<S>(),
        )
    })
}
