// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for decoding and rendering serialized queries

#![no_main]

use libfuzzer_sys::fuzz_target;
use specbridge_core::Query;

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = serde_json::from_slice::<Query>(data) {
        let rendered = query.to_query_string();
        assert!(rendered.starts_with("SELECT"));

        // Re-encoding a decoded query must succeed
        let encoded = serde_json::to_vec(&query).unwrap();
        let decoded: Query = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded.to_query_string(), rendered);
    }
});
