//! Configuration validation.

use super::types::{AdvisoryConfig, DetectionConfig, OutputConfig, ScaConfig};
use crate::model::PkgType;

/// A configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Validatable for ScaConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.advisories.validate());
        errors.extend(self.detection.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for AdvisoryConfig {
    fn validate(&self) -> Vec<ConfigError> {
        match &self.db_path {
            Some(path) if path.as_os_str().is_empty() => vec![ConfigError {
                field: "advisories.db_path".to_string(),
                message: "Path must not be empty".to_string(),
            }],
            _ => Vec::new(),
        }
    }
}

impl Validatable for DetectionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        self.skip_ecosystems
            .iter()
            .filter(|name| PkgType::from_purl_type(&name.to_lowercase()).is_none())
            .map(|name| ConfigError {
                field: "detection.skip_ecosystems".to_string(),
                message: format!(
                    "Unknown package type '{}'. Valid options: {}",
                    name,
                    PkgType::ALL.map(PkgType::as_str).join(", ")
                ),
            })
            .collect()
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(parent) = self.file.as_deref().and_then(std::path::Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                errors.push(ConfigError {
                    field: "output.file".to_string(),
                    message: format!("Parent directory does not exist: {}", parent.display()),
                });
            }
        }
        errors
    }
}
