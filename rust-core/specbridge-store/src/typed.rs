// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed, namespaced view over a `StorageBackend`.
//
// Values are stored as JSON under `"{namespace}#{key}"`. Entity type names
// routinely contain `:` (`shop::Product`), so `#` separates the namespace
// from the key to keep one entity's prefix from matching another's.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::StorageBackend;
use crate::error::StorageError;

/// Largest accepted full key, namespace included.
pub const MAX_KEY_SIZE: usize = 1024;

const SEPARATOR: char = '#';

/// JSON values under one namespace of a shared backend.
pub struct TypedStore<B: StorageBackend> {
    backend: B,
    namespace: String,
}

impl<B: StorageBackend> TypedStore<B> {
    /// All keys of this store are prefixed with `"{namespace}#"`.
    pub fn new(backend: B, namespace: &str) -> Self {
        Self {
            backend,
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn full_key(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let full = format!("{}{}{}", self.namespace, SEPARATOR, key).into_bytes();
        if full.len() > MAX_KEY_SIZE {
            return Err(StorageError::KeyTooLarge {
                size: full.len(),
                max: MAX_KEY_SIZE,
            });
        }
        Ok(full)
    }

    fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, StorageError> {
        serde_json::from_slice(bytes).map_err(|err| {
            StorageError::SerializationError(format!("failed to decode '{}': {}", key, err))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get(&self.full_key(key)?).await? {
            Some(bytes) => Ok(Some(Self::decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let full_key = self.full_key(key)?;
        let bytes = serde_json::to_vec(value).map_err(|err| {
            StorageError::SerializationError(format!("failed to encode '{}': {}", key, err))
        })?;
        self.backend.put(&full_key, &bytes).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.backend.delete(&self.full_key(key)?).await
    }

    /// Up to `limit` entries of this namespace in key order, with the
    /// namespace stripped from the returned keys.
    pub async fn scan<T: DeserializeOwned>(
        &self,
        limit: usize,
    ) -> Result<Vec<(String, T)>, StorageError> {
        let prefix = format!("{}{}", self.namespace, SEPARATOR);
        let raw = self.backend.scan_prefix(prefix.as_bytes(), limit).await?;

        raw.into_iter()
            .map(|(raw_key, bytes)| {
                let key = String::from_utf8(raw_key[prefix.len()..].to_vec()).map_err(|err| {
                    StorageError::CorruptedData(format!("non UTF-8 key in '{}': {}", self.namespace, err))
                })?;
                let value = Self::decode(&key, &bytes)?;
                Ok((key, value))
            })
            .collect()
    }
}
