// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for alias derivation from arbitrary entity names

#![no_main]

use libfuzzer_sys::fuzz_target;
use specbridge_core::{HandlerRegistry, RegistryConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let registry = HandlerRegistry::builder(RegistryConfig::default()).build();
        let mut ctx = registry.create_context();

        let names: Vec<&str> = s.split('\n').take(32).collect();
        let aliases: Vec<String> = names.iter().map(|name| ctx.alias_for(*name)).collect();

        // Same entity, same alias
        for (name, alias) in names.iter().zip(&aliases) {
            assert_eq!(&ctx.alias_for(*name), alias);
        }
    }
});
