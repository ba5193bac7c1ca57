// SPDX-License-Identifier: PMPL-1.0-or-later
//! SpecBridge Core
//!
//! Translates composable specification trees into query-builder conditions.
//! Specifications stay storage-agnostic; handlers registered per concrete
//! specification type compile them into [`Condition`] fragments through a
//! per-query [`QueryContext`] that owns aliases, joins and parameters.
//!
//! ```rust
//! use specbridge_core::{CompareOp, FieldCompare, FieldCompareHandler, HandlerRegistry, RegistryConfig};
//! use specbridge_core::SpecificationExt;
//!
//! let mut builder = HandlerRegistry::builder(RegistryConfig::default());
//! builder.with_logical_handlers().unwrap().register(FieldCompareHandler).unwrap();
//! let registry = builder.build();
//!
//! let spec = FieldCompare::new("shop::Product", "article", CompareOp::Eq, "A1")
//!     .unwrap()
//!     .or(FieldCompare::new("shop::Product", "article", CompareOp::Eq, "A2").unwrap());
//!
//! let mut ctx = registry.create_context();
//! ctx.select(["p"]).from("shop::Product", "p");
//! ctx.match_spec(&spec).unwrap();
//! assert_eq!(
//!     ctx.to_query_string(),
//!     "SELECT p FROM shop::Product p WHERE p.article = :article_0 OR p.article = :article_1"
//! );
//! ```

pub mod condition;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod field;
pub mod handler;
pub mod logical;
pub mod param;
pub mod query;
pub mod registry;
pub mod spec;

pub use condition::{is_identifier, CompareOp, Condition, FieldRef, Operand};
pub use config::{DuplicatePolicy, RegistryConfig};
pub use context::QueryContext;
pub use entity::{Entity, EntityType};
pub use error::{RegistrationError, SpecificationError, UnsupportedReason, UnsupportedSpecificationError};
pub use field::{FieldCompare, FieldCompareHandler};
pub use handler::{downcast_spec, Capability, ConditionHandler, Handler};
pub use logical::{AllOfHandler, AnyHandler, AnyOfHandler, NotHandler};
pub use param::{compare_values, ParamValue, Parameters};
pub use query::{Direction, FromClause, JoinClause, JoinKind, OrderBy, Query};
pub use registry::{HandlerRegistry, HandlerRegistryBuilder};
pub use spec::{AllOf, Any, AnyOf, BoxedSpecification, Not, SpecType, Specification, SpecificationExt};
