//! Inference and registry configuration.

use crate::error::Result;
use crate::inference::TypeMapping;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Naming conventions used to detect foreign keys and synthesize index names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConventions {
    /// Suffix appended to a singularized relation name to form its foreign-key
    /// column (`user` + `_id`).
    pub foreign_key_suffix: String,
    /// Trailing component of synthesized index names.
    pub index_suffix: String,
}

impl Default for NamingConventions {
    fn default() -> Self {
        Self {
            foreign_key_suffix: "_id".to_string(),
            index_suffix: "index".to_string(),
        }
    }
}

impl NamingConventions {
    /// Set the foreign-key suffix.
    pub fn with_foreign_key_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.foreign_key_suffix = suffix.into();
        self
    }

    /// Set the index-name suffix.
    pub fn with_index_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.index_suffix = suffix.into();
        self
    }
}

/// Configuration for catalog inference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Native-type to semantic-type table.
    pub types: TypeMapping,
    /// Naming conventions for synthesized index names.
    pub naming: NamingConventions,
    /// Fail inference on unmappable native types instead of degrading them.
    pub strict_types: bool,
}

impl InferenceConfig {
    /// Create a configuration using the given type mapping.
    pub fn new(types: TypeMapping) -> Self {
        Self {
            types,
            ..Default::default()
        }
    }

    /// Set the naming conventions.
    pub fn with_naming(mut self, naming: NamingConventions) -> Self {
        self.naming = naming;
        self
    }

    /// Treat unsupported native types as fatal.
    pub fn strict(mut self) -> Self {
        self.strict_types = true;
        self
    }
}

/// Configuration for a registry build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Catalog inference settings.
    pub inference: InferenceConfig,
    /// Naming conventions for association resolution.
    pub naming: NamingConventions,
    /// Bind associations to `<singular>_id` columns that carry no declared
    /// foreign key.
    pub detect_conventions: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            naming: NamingConventions::default(),
            detect_conventions: true,
        }
    }
}

impl RegistryConfig {
    /// Set the inference configuration.
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    /// Set the naming conventions used by both inference and resolution.
    pub fn with_naming(mut self, naming: NamingConventions) -> Self {
        self.inference.naming = naming.clone();
        self.naming = naming;
        self
    }

    /// Enable or disable convention-based foreign-key detection.
    pub fn detect_conventions(mut self, detect: bool) -> Self {
        self.detect_conventions = detect;
        self
    }

    /// Decode a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SemanticType;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();

        assert!(config.detect_conventions);
        assert!(!config.inference.strict_types);
        assert_eq!(config.naming.foreign_key_suffix, "_id");
        assert_eq!(config.naming.index_suffix, "index");
    }

    #[test]
    fn test_with_naming_applies_to_inference() {
        let config = RegistryConfig::default()
            .with_naming(NamingConventions::default().with_index_suffix("idx"));

        assert_eq!(config.naming.index_suffix, "idx");
        assert_eq!(config.inference.naming.index_suffix, "idx");
    }

    #[test]
    fn test_from_json_partial() {
        let config = RegistryConfig::from_json(
            r#"{
                "detect_conventions": false,
                "naming": { "foreign_key_suffix": "_ref" },
                "inference": {
                    "strict_types": true,
                    "types": { "entries": { "citext": "text" } }
                }
            }"#,
        )
        .unwrap();

        assert!(!config.detect_conventions);
        assert_eq!(config.naming.foreign_key_suffix, "_ref");
        assert_eq!(config.naming.index_suffix, "index");
        assert!(config.inference.strict_types);
        assert_eq!(
            config.inference.types.lookup("CITEXT"),
            Some(SemanticType::Text)
        );
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(RegistryConfig::from_json("{ not json").is_err());
    }
}
