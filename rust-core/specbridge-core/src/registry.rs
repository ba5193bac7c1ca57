// SPDX-License-Identifier: PMPL-1.0-or-later
//! Handler registry.
//!
//! Built once through [`HandlerRegistryBuilder`], then frozen. A frozen
//! [`HandlerRegistry`] is `Send + Sync` and can be shared behind an `Arc`
//! by any number of concurrent query builders.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::context::QueryContext;
use crate::error::{RegistrationError, UnsupportedSpecificationError};
use crate::handler::{Capability, ConditionHandler, Handler};
use crate::logical::{AllOfHandler, AnyHandler, AnyOfHandler, NotHandler};
use crate::spec::{SpecType, Specification};

/// Mutable registration phase of a [`HandlerRegistry`].
pub struct HandlerRegistryBuilder {
    config: RegistryConfig,
    handlers: HashMap<SpecType, Arc<dyn Handler>>,
    order: Vec<SpecType>,
}

impl HandlerRegistryBuilder {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            handlers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register `handler` under the specification type it declares.
    pub fn register<H: Handler + 'static>(
        &mut self,
        handler: H,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_shared(Arc::new(handler))
    }

    /// Register an already shared handler.
    pub fn register_shared(
        &mut self,
        handler: Arc<dyn Handler>,
    ) -> Result<&mut Self, RegistrationError> {
        let spec_type = handler.specification_type();

        if let Some(existing) = self.handlers.get(&spec_type) {
            match self.config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return Err(RegistrationError::Duplicate {
                        specification: spec_type.name(),
                        existing: existing.name(),
                        rejected: handler.name(),
                    });
                }
                DuplicatePolicy::Replace => {
                    warn!(
                        specification = spec_type.name(),
                        replaced = existing.name(),
                        handler = handler.name(),
                        "Replacing registered handler"
                    );
                }
            }
        } else {
            self.order.push(spec_type);
        }

        debug!(
            specification = spec_type.name(),
            handler = handler.name(),
            "Registered handler"
        );
        self.handlers.insert(spec_type, handler);
        Ok(self)
    }

    /// Register the handlers for `AllOf`, `AnyOf`, `Not` and `Any`.
    pub fn with_logical_handlers(&mut self) -> Result<&mut Self, RegistrationError> {
        self.register(AllOfHandler)?
            .register(AnyOfHandler)?
            .register(NotHandler)?
            .register(AnyHandler)
    }

    pub fn contains(&self, spec_type: SpecType) -> bool {
        self.handlers.contains_key(&spec_type)
    }

    /// Freeze the registry.
    pub fn build(self) -> HandlerRegistry {
        debug!(handlers = self.handlers.len(), "Handler registry built");
        HandlerRegistry {
            config: self.config,
            handlers: self.handlers,
            order: self.order,
        }
    }
}

impl Default for HandlerRegistryBuilder {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

/// Read-only mapping from specification type to its handler.
pub struct HandlerRegistry {
    config: RegistryConfig,
    handlers: HashMap<SpecType, Arc<dyn Handler>>,
    order: Vec<SpecType>,
}

impl HandlerRegistry {
    pub fn builder(config: RegistryConfig) -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new(config)
    }

    /// Reopen for registration; existing handlers are kept.
    pub fn into_builder(self) -> HandlerRegistryBuilder {
        HandlerRegistryBuilder {
            config: self.config,
            handlers: self.handlers,
            order: self.order,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Handler for the exact runtime type of `specification`, which must
    /// also have every capability in `required`.
    pub fn get_handler_for(
        &self,
        specification: &dyn Specification,
        required: &[Capability],
    ) -> Result<&dyn Handler, UnsupportedSpecificationError> {
        let spec_type = specification.spec_type();
        let handler = self
            .handlers
            .get(&spec_type)
            .ok_or_else(|| UnsupportedSpecificationError::no_handler(spec_type))?;

        if let Some(missing) = required.iter().find(|cap| !handler.has_capability(**cap)) {
            return Err(UnsupportedSpecificationError::missing_capability(
                spec_type,
                handler.name(),
                *missing,
            ));
        }

        Ok(&**handler)
    }

    /// Handler able to produce conditions for `specification`.
    pub fn condition_handler_for(
        &self,
        specification: &dyn Specification,
    ) -> Result<&dyn ConditionHandler, UnsupportedSpecificationError> {
        let handler = self.get_handler_for(specification, &[Capability::Condition])?;
        handler.as_condition_handler().ok_or_else(|| {
            UnsupportedSpecificationError::missing_capability(
                specification.spec_type(),
                handler.name(),
                Capability::Condition,
            )
        })
    }

    pub fn contains(&self, spec_type: SpecType) -> bool {
        self.handlers.contains_key(&spec_type)
    }

    /// Registered specification types in first-registration order.
    pub fn specification_types(&self) -> impl Iterator<Item = SpecType> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Start a new query bound to this registry.
    pub fn create_context(&self) -> QueryContext<'_> {
        QueryContext::new(self)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("config", &self.config)
            .field(
                "handlers",
                &self.order.iter().map(|t| t.short_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::error::UnsupportedReason;
    use crate::spec::{AllOf, Any, Not};

    #[derive(Debug)]
    struct Flagged;

    impl Specification for Flagged {
        fn is_satisfied_by(&self, _candidate: &dyn std::any::Any) -> bool {
            false
        }
    }

    /// Knows the type but cannot produce conditions.
    struct AuditOnlyHandler;

    impl Handler for AuditOnlyHandler {
        fn specification_type(&self) -> SpecType {
            SpecType::of::<Flagged>()
        }

        fn declared_capabilities(&self) -> &[Capability] {
            &[Capability::Named("audit")]
        }
    }

    struct FlaggedHandler;

    impl Handler for FlaggedHandler {
        fn specification_type(&self) -> SpecType {
            SpecType::of::<Flagged>()
        }

        fn as_condition_handler(&self) -> Option<&dyn ConditionHandler> {
            Some(self)
        }
    }

    impl ConditionHandler for FlaggedHandler {
        fn create_condition(
            &self,
            _specification: &dyn Specification,
            _context: &mut QueryContext<'_>,
        ) -> Result<Condition, UnsupportedSpecificationError> {
            Ok(Condition::True)
        }
    }

    #[test]
    fn test_unregistered_then_registered() {
        let registry = HandlerRegistry::builder(RegistryConfig::default()).build();
        let err = registry.get_handler_for(&Flagged, &[]).err().unwrap();
        assert_eq!(err.reason(), &UnsupportedReason::NoHandler);
        assert_eq!(err.specification(), SpecType::of::<Flagged>());

        let mut builder = registry.into_builder();
        builder.register(FlaggedHandler).unwrap();
        let registry = builder.build();
        let handler = registry.get_handler_for(&Flagged, &[]).unwrap();
        assert_eq!(handler.name(), "FlaggedHandler");
    }

    #[test]
    fn test_missing_capability_reported_distinctly() {
        let mut builder = HandlerRegistry::builder(RegistryConfig::default());
        builder.register(AuditOnlyHandler).unwrap();
        let registry = builder.build();

        assert!(registry
            .get_handler_for(&Flagged, &[Capability::Named("audit")])
            .is_ok());

        let err = registry.condition_handler_for(&Flagged).err().unwrap();
        assert_eq!(
            err.reason(),
            &UnsupportedReason::MissingCapability {
                handler: "AuditOnlyHandler",
                capability: Capability::Condition,
            }
        );
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut builder = HandlerRegistry::builder(RegistryConfig::default());
        builder.register(FlaggedHandler).unwrap();
        let err = builder.register(AuditOnlyHandler).err().unwrap();
        assert_eq!(
            err,
            RegistrationError::Duplicate {
                specification: SpecType::of::<Flagged>().name(),
                existing: "FlaggedHandler",
                rejected: "AuditOnlyHandler",
            }
        );
        let registry = builder.build();
        assert!(registry.condition_handler_for(&Flagged).is_ok());
    }

    #[test]
    fn test_duplicate_replaced_when_configured() {
        let mut builder = HandlerRegistry::builder(RegistryConfig::replacing());
        builder.register(FlaggedHandler).unwrap();
        builder.register(AuditOnlyHandler).unwrap();
        let registry = builder.build();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get_handler_for(&Flagged, &[]).unwrap().name(),
            "AuditOnlyHandler"
        );
    }

    #[test]
    fn test_logical_handlers_registered_in_order() {
        let mut builder = HandlerRegistryBuilder::default();
        builder.with_logical_handlers().unwrap();
        let registry = builder.build();
        let names: Vec<&str> = registry.specification_types().map(|t| t.short_name()).collect();
        assert_eq!(names, vec!["AllOf", "AnyOf", "Not", "Any"]);
        assert!(registry.contains(SpecType::of::<AllOf>()));
        assert!(registry.condition_handler_for(&Not::new(Any)).is_ok());
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HandlerRegistry>();
    }
}
