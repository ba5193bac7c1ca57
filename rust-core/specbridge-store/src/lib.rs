// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SpecBridge Store
//
// Execution side of SpecBridge: persists entity rows in a pluggable
// key-value backend and evaluates queries built by `specbridge-core`
// against them. The core never depends on this crate.
//
// # Modules
//
// - [`backend`] -- The `StorageBackend` key-value contract.
// - [`memory`] -- `BTreeMap`-based backend for tests and ephemeral data.
// - [`typed`] -- JSON-serialized, namespace-prefixed access over a backend.
// - [`entity_store`] -- Entity rows keyed per entity type.
// - [`executor`] -- Evaluates a materialized `Query` against stored rows.
// - [`config`] -- Executor limits.
// - [`error`] -- Storage and execution errors.
//
// See [`Executor`] for an end-to-end example.

pub mod backend;
pub mod config;
pub mod entity_store;
pub mod error;
pub mod executor;
pub mod memory;
pub mod typed;

pub use backend::StorageBackend;
pub use config::ExecutorConfig;
pub use entity_store::EntityStore;
pub use error::{ExecutionError, StorageError};
pub use executor::{Executor, ResultRow};
pub use memory::InMemoryBackend;
pub use typed::TypedStore;
