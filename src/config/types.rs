//! Configuration types for sca-core.

use crate::model::PkgType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaConfig {
    /// Advisory database settings
    pub advisories: AdvisoryConfig,
    /// Vulnerability matching settings
    pub detection: DetectionConfig,
    /// Output settings
    pub output: OutputConfig,
}

/// Where advisories come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// JSON advisory database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

/// Vulnerability matching behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Package types (PURL type names) excluded from matching
    pub skip_ecosystems: Vec<String>,
    /// Match packages of one application in parallel
    pub parallel: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            skip_ecosystems: Vec::new(),
            parallel: true,
        }
    }
}

impl DetectionConfig {
    /// Whether packages of `pkg_type` should not be matched.
    #[must_use]
    pub fn skips(&self, pkg_type: PkgType) -> bool {
        self.skip_ecosystems
            .iter()
            .any(|name| name.eq_ignore_ascii_case(pkg_type.as_str()))
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            file: None,
        }
    }
}
