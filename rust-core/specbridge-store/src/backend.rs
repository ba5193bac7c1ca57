// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key-value contract the entity store is written against.

use async_trait::async_trait;

use crate::error::StorageError;

/// A pluggable, ordered key-value storage backend.
///
/// Keys and values are opaque bytes. Prefix scans must return keys in
/// lexicographic order: entity rows are read back in insertion order by
/// relying on it.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Value stored under `key`, or `Ok(None)` when absent.
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`; `Ok(true)` when it existed.
    async fn delete(&self, key: &[u8]) -> Result<bool, StorageError>;

    /// Up to `limit` (key, value) pairs whose key starts with `prefix`.
    async fn scan_prefix(
        &self,
        prefix: &[u8],
        limit: usize,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;

    /// Make earlier writes durable. A no-op for memory backends.
    async fn flush(&self) -> Result<(), StorageError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
