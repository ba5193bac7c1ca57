// SPDX-License-Identifier: PMPL-1.0-or-later
//! Executor configuration.

use serde::{Deserialize, Serialize};

/// Limits applied by [`crate::Executor`]. Missing JSON fields take their
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Upper bound on rows loaded per FROM or JOIN clause. Exceeding it is
    /// an error, never a silent truncation.
    #[serde(default = "default_max_rows_per_entity")]
    pub max_rows_per_entity: usize,
    /// Truncate the result after ordering. `None` returns every row.
    #[serde(default)]
    pub max_result_rows: Option<usize>,
}

fn default_max_rows_per_entity() -> usize {
    10_000
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_rows_per_entity: default_max_rows_per_entity(),
            max_result_rows: None,
        }
    }
}

impl ExecutorConfig {
    pub fn with_max_result_rows(mut self, limit: usize) -> Self {
        self.max_result_rows = Some(limit);
        self
    }
}
