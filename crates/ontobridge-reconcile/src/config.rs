//! Run configuration.

use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Cross-reference values under this prefix link a resource to its counterpart.
    pub reserved_namespace: String,
    /// Prefix of freshly minted identifiers.
    pub identifier_prefix: String,
    /// Zero-padded width of the identifier sequence.
    pub identifier_width: usize,
    /// Source annotation naming the model class a domain class is filed under.
    pub attachment_annotation: String,
    /// Source annotation that excludes a property from a merge when `true`.
    pub ignore_annotation: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            reserved_namespace: "http://ontologies.dbmi.pitt.edu".to_string(),
            identifier_prefix: "DP".to_string(),
            identifier_width: 6,
            attachment_annotation: "hasModel".to_string(),
            ignore_annotation: "ignore".to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Read a JSON config; missing fields keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|source| ReconcileError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn format_identifier(&self, sequence: u64) -> String {
        format!(
            "{}{:0width$}",
            self.identifier_prefix,
            sequence,
            width = self.identifier_width
        )
    }

    pub fn is_reserved(&self, value: &str) -> bool {
        value.starts_with(&self.reserved_namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_zero_padded() {
        let config = ReconcileConfig::default();
        assert_eq!(config.format_identifier(1), "DP000001");
        assert_eq!(config.format_identifier(1234567), "DP1234567");
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reconcile.json");
        std::fs::write(&path, r#"{ "identifier_prefix": "XO", "identifier_width": 4 }"#).unwrap();

        let config = ReconcileConfig::from_path(&path).unwrap();
        assert_eq!(config.format_identifier(7), "XO0007");
        assert_eq!(config.attachment_annotation, "hasModel");
        assert!(config.is_reserved("http://ontologies.dbmi.pitt.edu/x.owl#XO0001"));
    }

    #[test]
    fn malformed_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ nope").unwrap();
        let err = ReconcileConfig::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
