// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error types for the store and the query executor.

use thiserror::Error;

/// Failures of the key-value layer and its JSON encoding.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Raised by file or network backends; the in-memory backend never
    /// fails this way.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Stored bytes decoded, but not into the shape an entity row needs.
    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("key too large: {size} bytes (max: {max})")]
    KeyTooLarge { size: usize, max: usize },
}

/// Failures while evaluating a materialized query.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("query has no FROM clause")]
    NoRoot,

    #[error("alias '{0}' is not bound by any FROM or JOIN clause")]
    UnknownAlias(String),

    #[error("parameter ':{0}' is referenced but not bound")]
    UnknownParameter(String),

    /// More rows of `entity` are stored than the executor may scan.
    #[error("{entity} holds more than {max} rows; raise max_rows_per_entity")]
    RowLimitExceeded { entity: String, max: usize },

    #[error("unsupported select item '{0}'")]
    UnsupportedSelect(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
