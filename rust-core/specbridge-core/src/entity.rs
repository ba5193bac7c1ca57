// SPDX-License-Identifier: PMPL-1.0-or-later
//! Entity type identifiers.
//!
//! The mapping layer is external; the core only needs a stable string per
//! entity type to reference it in FROM/JOIN clauses and derive aliases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a queryable entity type, e.g. `shop::Product`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Identifier of a Rust type implementing [`Entity`].
    pub fn of<E: Entity>() -> Self {
        Self(E::ENTITY_TYPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, accepting `::`, `\` and `.` separators.
    pub fn short_name(&self) -> &str {
        self.0
            .rsplit(|c| c == ':' || c == '\\' || c == '.')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EntityType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&EntityType> for EntityType {
    fn from(entity: &EntityType) -> Self {
        entity.clone()
    }
}

/// A Rust type persisted as an entity.
pub trait Entity {
    const ENTITY_TYPE: &'static str;

    fn entity_type() -> EntityType
    where
        Self: Sized,
    {
        EntityType::of::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Product;

    impl Entity for Product {
        const ENTITY_TYPE: &'static str = "shop::catalog::Product";
    }

    #[test]
    fn test_short_name_variants() {
        assert_eq!(EntityType::new("shop::catalog::Product").short_name(), "Product");
        assert_eq!(EntityType::new("App\\Entity\\Order").short_name(), "Order");
        assert_eq!(EntityType::new("billing.Invoice").short_name(), "Invoice");
        assert_eq!(EntityType::new("Foo").short_name(), "Foo");
    }

    #[test]
    fn test_entity_trait_identifier() {
        assert_eq!(Product::entity_type().as_str(), "shop::catalog::Product");
        assert_eq!(EntityType::of::<Product>(), EntityType::from("shop::catalog::Product"));
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&EntityType::new("Foo")).unwrap();
        assert_eq!(json, "\"Foo\"");
    }
}
