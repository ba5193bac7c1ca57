// SPDX-License-Identifier: PMPL-1.0-or-later
//! Registry configuration.

use serde::{Deserialize, Serialize};

/// What to do when a second handler is registered for the same
/// specification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with [`crate::RegistrationError::Duplicate`].
    #[default]
    Reject,
    /// The last registration wins.
    Replace,
}

/// Configuration for [`crate::HandlerRegistryBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Duplicate registration handling.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl RegistryConfig {
    /// Configuration where re-registering a type replaces its handler.
    pub fn replacing() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Replace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rejects_duplicates() {
        assert_eq!(RegistryConfig::default().duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = RegistryConfig::replacing();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"duplicate_policy":"replace"}"#);
        let parsed: RegistryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_policy_defaults_to_reject() {
        let parsed: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.duplicate_policy, DuplicatePolicy::Reject);
    }
}
