// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Entity rows over a storage backend.
//
// Every entity type gets its own `TypedStore` namespace. Row keys are
// zero-padded sequence numbers, so a prefix scan returns rows in insertion
// order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use specbridge_core::{Entity, EntityType};
use tracing::trace;

use crate::backend::StorageBackend;
use crate::error::StorageError;
use crate::typed::TypedStore;

/// Stores JSON object rows keyed by entity type. Clones share the backend
/// and the key sequence.
#[derive(Debug, Clone)]
pub struct EntityStore<B: StorageBackend + Clone> {
    backend: B,
    next_key: Arc<AtomicU64>,
}

impl<B: StorageBackend + Clone> EntityStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            next_key: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn table(&self, entity: &EntityType) -> TypedStore<B> {
        TypedStore::new(self.backend.clone(), entity.as_str())
    }

    /// Insert a typed entity under its [`Entity::ENTITY_TYPE`].
    pub async fn insert<E: Entity + Serialize>(&self, entity: &E) -> Result<String, StorageError> {
        let row = serde_json::to_value(entity).map_err(|err| {
            StorageError::SerializationError(format!("failed to encode {}: {}", E::ENTITY_TYPE, err))
        })?;
        self.insert_row(E::entity_type(), row).await
    }

    /// Insert a raw row; returns its key.
    pub async fn insert_row(
        &self,
        entity: impl Into<EntityType>,
        row: Value,
    ) -> Result<String, StorageError> {
        let entity = entity.into();
        if !row.is_object() {
            return Err(StorageError::CorruptedData(format!(
                "{} rows must be JSON objects",
                entity
            )));
        }

        let key = format!("{:020}", self.next_key.fetch_add(1, Ordering::Relaxed));
        self.table(&entity).put(&key, &row).await?;
        trace!(entity = %entity, key = %key, "Inserted row");
        Ok(key)
    }

    pub async fn row(&self, entity: &EntityType, key: &str) -> Result<Value, StorageError> {
        self.table(entity)
            .get(key)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("{}#{}", entity, key)))
    }

    pub async fn delete(&self, entity: &EntityType, key: &str) -> Result<bool, StorageError> {
        self.table(entity).delete(key).await
    }

    /// Up to `limit` rows of `entity` in insertion order.
    pub async fn rows(&self, entity: &EntityType, limit: usize) -> Result<Vec<Value>, StorageError> {
        let rows: Vec<(String, Value)> = self.table(entity).scan(limit).await?;
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    /// Up to `limit` rows of `E`, decoded.
    pub async fn load<E: Entity + DeserializeOwned>(&self, limit: usize) -> Result<Vec<E>, StorageError> {
        let rows: Vec<(String, E)> = self.table(&E::entity_type()).scan(limit).await?;
        Ok(rows.into_iter().map(|(_, entity)| entity).collect())
    }
}
