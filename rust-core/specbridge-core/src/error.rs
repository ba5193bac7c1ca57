// SPDX-License-Identifier: PMPL-1.0-or-later
//! Translation error types.

use thiserror::Error;

use crate::handler::Capability;
use crate::spec::SpecType;

/// Why a specification could not be translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The registry holds no handler for the specification's type.
    NoHandler,
    /// A handler exists but lacks a capability the caller required.
    MissingCapability {
        handler: &'static str,
        capability: Capability,
    },
    /// A handler was given a specification of a type it does not support.
    WrongVariant {
        handler: &'static str,
        expected: &'static str,
    },
    /// A composite handler was given a composite without children.
    EmptyComposite { handler: &'static str },
}

/// A specification the translation layer cannot handle.
///
/// Always a wiring or programming error; never recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.specification, .reason, .composites))]
pub struct UnsupportedSpecificationError {
    specification: SpecType,
    reason: UnsupportedReason,
    composites: Vec<&'static str>,
}

impl UnsupportedSpecificationError {
    pub fn new(specification: SpecType, reason: UnsupportedReason) -> Self {
        Self {
            specification,
            reason,
            composites: Vec::new(),
        }
    }

    pub fn no_handler(specification: SpecType) -> Self {
        Self::new(specification, UnsupportedReason::NoHandler)
    }

    pub fn missing_capability(
        specification: SpecType,
        handler: &'static str,
        capability: Capability,
    ) -> Self {
        Self::new(
            specification,
            UnsupportedReason::MissingCapability { handler, capability },
        )
    }

    pub fn wrong_variant(specification: SpecType, handler: &'static str, expected: SpecType) -> Self {
        Self::new(
            specification,
            UnsupportedReason::WrongVariant {
                handler,
                expected: expected.name(),
            },
        )
    }

    pub fn empty_composite(specification: SpecType, handler: &'static str) -> Self {
        Self::new(specification, UnsupportedReason::EmptyComposite { handler })
    }

    /// Record a composite handler the error propagated through.
    pub fn within(mut self, composite_handler: &'static str) -> Self {
        self.composites.push(composite_handler);
        self
    }

    /// Concrete type of the offending specification.
    pub fn specification(&self) -> SpecType {
        self.specification
    }

    pub fn reason(&self) -> &UnsupportedReason {
        &self.reason
    }

    /// Composite handlers the error passed through, innermost first.
    pub fn composites(&self) -> &[&'static str] {
        &self.composites
    }

    /// The handler that rejected the specification, if one was involved.
    pub fn handler(&self) -> Option<&'static str> {
        match self.reason {
            UnsupportedReason::NoHandler => None,
            UnsupportedReason::MissingCapability { handler, .. }
            | UnsupportedReason::WrongVariant { handler, .. }
            | UnsupportedReason::EmptyComposite { handler } => Some(handler),
        }
    }
}

fn describe(specification: &SpecType, reason: &UnsupportedReason, composites: &[&'static str]) -> String {
    let mut message = match reason {
        UnsupportedReason::NoHandler => format!(
            "{} specification is not supported: no handler registered.",
            specification
        ),
        UnsupportedReason::MissingCapability { handler, capability } => format!(
            "{} specification is not supported: {} lacks the {} capability.",
            specification, handler, capability
        ),
        UnsupportedReason::WrongVariant { handler, expected } => format!(
            "{} supports only {} specifications, but {} given.",
            handler, expected, specification
        ),
        UnsupportedReason::EmptyComposite { handler } => format!(
            "{} cannot translate {} without nested specifications.",
            handler, specification
        ),
    };
    if !composites.is_empty() {
        message.push_str(" Nested in: ");
        message.push_str(&composites.join(" < "));
    }
    message
}

/// Errors raised while building a [`crate::HandlerRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{specification} already handled by {existing}; refusing to register {rejected}")]
    Duplicate {
        specification: &'static str,
        existing: &'static str,
        rejected: &'static str,
    },
}

/// Errors raised while constructing specifications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecificationError {
    #[error("{0} requires at least one nested specification")]
    EmptyComposite(&'static str),

    /// Field names are rendered into condition text and must be plain
    /// identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("'{0}' is not a valid field identifier")]
    InvalidIdentifier(String),
}
