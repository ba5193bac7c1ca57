// SPDX-License-Identifier: PMPL-1.0-or-later
//! Specification contract and the logical combinators.
//!
//! A specification is an immutable predicate over domain objects. It knows
//! nothing about queries; the registry dispatches on its concrete runtime
//! type ([`SpecType`]) to find the handler that translates it.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::SpecificationError;

/// Owned, type-erased specification.
pub type BoxedSpecification = Box<dyn Specification>;

/// Identity of a concrete specification type, used as the dispatch key.
///
/// Equality and hashing use the [`TypeId`] only; the name is diagnostic.
#[derive(Debug, Clone, Copy)]
pub struct SpecType {
    id: TypeId,
    name: &'static str,
}

impl SpecType {
    /// The type identity of `S`.
    pub fn of<S: Specification>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    /// The concrete type of a type-erased specification.
    pub fn of_value(specification: &dyn Specification) -> Self {
        specification.spec_type()
    }

    /// The dispatch key compared by [`PartialEq`] and [`Hash`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `specbridge_core::spec::AllOf`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for SpecType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SpecType {}

impl Hash for SpecType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for SpecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strip the module path (and any generic arguments) from a type name.
pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Runtime type access for specifications, implemented for every sized type.
///
/// Always call these through `&dyn Specification`: on a
/// `Box<dyn Specification>` they would report the box itself.
pub trait AsAnySpecification {
    fn as_any(&self) -> &dyn std::any::Any;
    fn spec_type(&self) -> SpecType;
}

impl<T: Specification> AsAnySpecification for T {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn spec_type(&self) -> SpecType {
        SpecType::of::<T>()
    }
}

/// A predicate describing the subset of candidates it accepts.
pub trait Specification: AsAnySpecification + fmt::Debug + Send + Sync + 'static {
    /// In-memory check against a loaded candidate. Candidates of an
    /// unexpected type are simply not satisfied.
    fn is_satisfied_by(&self, candidate: &dyn std::any::Any) -> bool;
}

/// Conjunction of one or more specifications.
#[derive(Debug)]
pub struct AllOf {
    children: Vec<BoxedSpecification>,
}

impl AllOf {
    /// Build from a non-empty list of children.
    pub fn new(children: Vec<BoxedSpecification>) -> Result<Self, SpecificationError> {
        if children.is_empty() {
            return Err(SpecificationError::EmptyComposite("AllOf"));
        }
        Ok(Self { children })
    }

    /// Build from a first child plus any number of further children.
    pub fn of(first: BoxedSpecification, rest: Vec<BoxedSpecification>) -> Self {
        let mut children = Vec::with_capacity(rest.len() + 1);
        children.push(first);
        children.extend(rest);
        Self { children }
    }

    #[cfg(test)]
    pub(crate) fn unchecked(children: Vec<BoxedSpecification>) -> Self {
        Self { children }
    }

    /// Children in construction order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = &dyn Specification> + '_ {
        self.children.iter().map(|child| &**child)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Specification for AllOf {
    fn is_satisfied_by(&self, candidate: &dyn std::any::Any) -> bool {
        self.children().all(|child| child.is_satisfied_by(candidate))
    }
}

/// Disjunction of one or more specifications.
#[derive(Debug)]
pub struct AnyOf {
    children: Vec<BoxedSpecification>,
}

impl AnyOf {
    /// Build from a non-empty list of children.
    pub fn new(children: Vec<BoxedSpecification>) -> Result<Self, SpecificationError> {
        if children.is_empty() {
            return Err(SpecificationError::EmptyComposite("AnyOf"));
        }
        Ok(Self { children })
    }

    /// Build from a first child plus any number of further children.
    pub fn of(first: BoxedSpecification, rest: Vec<BoxedSpecification>) -> Self {
        let mut children = Vec::with_capacity(rest.len() + 1);
        children.push(first);
        children.extend(rest);
        Self { children }
    }

    #[cfg(test)]
    pub(crate) fn unchecked(children: Vec<BoxedSpecification>) -> Self {
        Self { children }
    }

    /// Children in construction order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = &dyn Specification> + '_ {
        self.children.iter().map(|child| &**child)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Specification for AnyOf {
    fn is_satisfied_by(&self, candidate: &dyn std::any::Any) -> bool {
        self.children().any(|child| child.is_satisfied_by(candidate))
    }
}

/// Negation of exactly one specification.
#[derive(Debug)]
pub struct Not {
    child: BoxedSpecification,
}

impl Not {
    /// Negate `child`. Nested negations are kept, never simplified.
    pub fn new<S: Specification>(child: S) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub fn boxed(child: BoxedSpecification) -> Self {
        Self { child }
    }

    pub fn child(&self) -> &dyn Specification {
        &*self.child
    }
}

impl Specification for Not {
    fn is_satisfied_by(&self, candidate: &dyn std::any::Any) -> bool {
        !self.child().is_satisfied_by(candidate)
    }
}

/// Tautology: satisfied by every candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Any;

impl Specification for Any {
    fn is_satisfied_by(&self, _candidate: &dyn std::any::Any) -> bool {
        true
    }
}

/// Fluent combinators available on every specification.
pub trait SpecificationExt: Specification + Sized {
    fn and<S: Specification>(self, other: S) -> AllOf {
        AllOf::of(Box::new(self), vec![Box::new(other)])
    }

    fn or<S: Specification>(self, other: S) -> AnyOf {
        AnyOf::of(Box::new(self), vec![Box::new(other)])
    }

    fn not(self) -> Not {
        Not::new(self)
    }

    fn boxed(self) -> BoxedSpecification {
        Box::new(self)
    }
}

impl<T: Specification> SpecificationExt for T {}

/// Conjunction of the listed specifications.
///
/// ```rust
/// use specbridge_core::{all_of, Any, Specification};
/// let spec = all_of![Any, Any];
/// assert_eq!(spec.len(), 2);
/// assert!(spec.is_satisfied_by(&()));
/// ```
#[macro_export]
macro_rules! all_of {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $crate::spec::AllOf::of(
            ::std::boxed::Box::new($first),
            ::std::vec![$(::std::boxed::Box::new($rest) as $crate::spec::BoxedSpecification),*],
        )
    };
}

/// Disjunction of the listed specifications.
#[macro_export]
macro_rules! any_of {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $crate::spec::AnyOf::of(
            ::std::boxed::Box::new($first),
            ::std::vec![$(::std::boxed::Box::new($rest) as $crate::spec::BoxedSpecification),*],
        )
    };
}
