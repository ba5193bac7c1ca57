// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for specification translation

use proptest::prelude::*;
use specbridge_core::{
    AllOf, AnyOf, BoxedSpecification, Condition, FieldCompare, FieldCompareHandler,
    HandlerRegistry, Not, RegistryConfig, SpecificationExt,
};

fn registry() -> HandlerRegistry {
    let mut builder = HandlerRegistry::builder(RegistryConfig::default());
    builder
        .with_logical_handlers()
        .unwrap()
        .register(FieldCompareHandler)
        .unwrap();
    builder.build()
}

/// Generate arbitrary simple entity names
fn arb_entity() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,8}"
}

/// Generate arbitrary field names
fn arb_field() -> impl Strategy<Value = String> {
    "[a-z]{3,10}"
}

/// Generate (field, value) pairs for leaf comparisons
fn arb_leaves() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((arb_field(), "[A-Za-z0-9]{1,6}"), 1..8)
}

fn leaves(entity: &str, pairs: &[(String, String)]) -> Vec<BoxedSpecification> {
    pairs
        .iter()
        .map(|(field, value)| FieldCompare::equals(entity, field.as_str(), value.as_str()).unwrap().boxed())
        .collect()
}

fn expected_fragments(alias: &str, pairs: &[(String, String)]) -> Vec<String> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (field, _))| format!("{}.{} = :{}_{}", alias, field, field, i))
        .collect()
}

fn grouped(parts: &[String], separator: &str) -> String {
    if parts.len() == 1 {
        parts[0].clone()
    } else {
        format!("({})", parts.join(separator))
    }
}

proptest! {
    #[test]
    fn test_alias_is_stable(entity in arb_entity(), repeats in 1usize..10) {
        let registry = registry();
        let mut ctx = registry.create_context();
        let first = ctx.alias_for(entity.as_str());
        prop_assert_eq!(&first, &format!("{}0", entity.to_lowercase()));
        for _ in 0..repeats {
            prop_assert_eq!(&ctx.alias_for(entity.as_str()), &first);
        }
    }

    #[test]
    fn test_all_of_preserves_child_order(entity in arb_entity(), pairs in arb_leaves()) {
        let registry = registry();
        let mut ctx = registry.create_context();
        let spec = AllOf::new(leaves(&entity, &pairs)).unwrap();

        let condition = ctx.translate(&spec).unwrap();
        let alias = ctx.alias_for(entity.as_str());
        let expected = grouped(&expected_fragments(&alias, &pairs), " AND ");
        prop_assert_eq!(condition.to_string(), expected);
        prop_assert_eq!(ctx.parameters().len(), pairs.len());
    }

    #[test]
    fn test_any_of_preserves_child_order(entity in arb_entity(), pairs in arb_leaves()) {
        let registry = registry();
        let mut ctx = registry.create_context();
        let spec = AnyOf::new(leaves(&entity, &pairs)).unwrap();

        let condition = ctx.translate(&spec).unwrap();
        let alias = ctx.alias_for(entity.as_str());
        let expected = grouped(&expected_fragments(&alias, &pairs), " OR ");
        prop_assert_eq!(condition.to_string(), expected);
    }

    #[test]
    fn test_translation_is_reproducible(entity in arb_entity(), pairs in arb_leaves()) {
        let registry = registry();
        let build = || {
            let mut ctx = registry.create_context();
            let spec = AnyOf::new(vec![
                AllOf::new(leaves(&entity, &pairs)).unwrap().boxed(),
                Not::boxed(AnyOf::new(leaves(&entity, &pairs)).unwrap().boxed()).boxed(),
            ])
            .unwrap();
            ctx.match_spec(&spec).unwrap();
            ctx.build()
        };
        prop_assert_eq!(build(), build());
    }

    #[test]
    fn test_negation_nesting_depth(depth in 1usize..6) {
        let registry = registry();
        let mut ctx = registry.create_context();
        let mut spec: BoxedSpecification = FieldCompare::equals("Item", "code", "X").unwrap().boxed();
        for _ in 0..depth {
            spec = Not::boxed(spec).boxed();
        }

        let condition = ctx.translate(&*spec).unwrap();
        let mut expected = "item0.code = :code_0".to_string();
        for _ in 0..depth {
            expected = format!("NOT({})", expected);
        }
        prop_assert_eq!(condition.to_string(), expected);
    }

    #[test]
    fn test_repeated_matches_accumulate(pairs in arb_leaves()) {
        let registry = registry();
        let mut ctx = registry.create_context();
        for (field, value) in &pairs {
            let spec = FieldCompare::equals("Item", field.as_str(), value.as_str()).unwrap();
            ctx.match_spec(&spec).unwrap();
        }
        let parts = match ctx.filter() {
            Some(Condition::And(parts)) => parts.len(),
            Some(_) => 1,
            None => 0,
        };
        prop_assert_eq!(parts, pairs.len());
    }
}
