//! Service configuration.

use provenance_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Chain service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Evidence kind used for approval notes
    pub note_evidence_kind: String,
    /// Limit applied by `what_changed` when the caller passes 0 (0 = unlimited)
    pub default_query_limit: usize,
    /// Hash characters shown in logs
    pub hash_preview_len: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            note_evidence_kind: "note".to_string(),
            default_query_limit: 0,
            hash_preview_len: 10,
        }
    }
}

impl ChainConfig {
    /// Load from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed JSON or an empty note kind
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::validation("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants
    ///
    /// # Errors
    ///
    /// Returns a validation error if `note_evidence_kind` is empty
    pub fn validate(&self) -> CoreResult<()> {
        if self.note_evidence_kind.trim().is_empty() {
            return Err(CoreError::validation(
                "note_evidence_kind",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ChainConfig::default();
        assert_eq!(config.note_evidence_kind, "note");
        assert_eq!(config.default_query_limit, 0);
        assert_eq!(config.hash_preview_len, 10);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_partial_json() {
        let config = ChainConfig::from_json(r#"{"default_query_limit": 50}"#).unwrap();
        assert_eq!(config.default_query_limit, 50);
        assert_eq!(config.note_evidence_kind, "note");
    }

    #[test]
    fn test_config_rejects_bad_input() {
        assert!(matches!(
            ChainConfig::from_json("{"),
            Err(CoreError::Validation { .. })
        ));
        assert!(matches!(
            ChainConfig::from_json(r#"{"note_evidence_kind": " "}"#),
            Err(CoreError::Validation { .. })
        ));
    }
}
