//! Configuration file loading and discovery.

use super::types::ScaConfig;
use std::path::{Path, PathBuf};

/// Config file names searched in each candidate directory.
const CONFIG_FILE_NAMES: &[&str] = &[".sca-core.yaml", ".sca-core.yml", "sca-core.yaml"];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. User config directory (~/.config/sca-core/)
/// 4. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path.filter(|p| p.exists()) {
        return Some(path.to_path_buf());
    }

    let candidates = [
        std::env::current_dir().ok(),
        dirs::config_dir().map(|dir| dir.join("sca-core")),
        dirs::home_dir(),
    ];
    candidates
        .iter()
        .flatten()
        .find_map(|dir| find_config_in_dir(dir))
}

fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml_ng::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Config file not found: {}", path.display()),
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml_ng::Error> for ConfigFileError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load a `ScaConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<ScaConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml_ng::from_str(&content)?)
}

/// Load config from the discovered file, or fall back to defaults.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (ScaConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (ScaConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (ScaConfig::default(), None)
            }
        },
    )
}

impl ScaConfig {
    /// Merge another config into this one, with `other` taking precedence
    /// wherever it differs from the defaults.
    pub fn merge(&mut self, other: &Self) {
        if other.advisories.db_path.is_some() {
            self.advisories.db_path.clone_from(&other.advisories.db_path);
        }

        for name in &other.detection.skip_ecosystems {
            if !self
                .detection
                .skip_ecosystems
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(name))
            {
                self.detection.skip_ecosystems.push(name.clone());
            }
        }
        if !other.detection.parallel {
            self.detection.parallel = false;
        }

        if !other.output.pretty {
            self.output.pretty = false;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
    }

    /// Load from the discovered file and layer `overrides` on top.
    #[must_use]
    pub fn from_file_with_overrides(config_path: Option<&Path>, overrides: &Self) -> Self {
        let (mut config, _) = load_or_default(config_path);
        config.merge(overrides);
        config
    }
}

/// Generate an example config file with every option documented.
#[must_use]
pub fn generate_example_config() -> String {
    r"# sca-core configuration
# Place this file at .sca-core.yaml in your project or ~/.config/sca-core/

advisories:
  # JSON advisory database used by `sca-core scan`
  # db_path: ./advisories.json

detection:
  # Package types excluded from vulnerability matching (PURL type names)
  skip_ecosystems: []
  # Match packages of one application in parallel
  parallel: true

output:
  # Pretty-print JSON output
  pretty: true
  # Output file path (omit for stdout)
  # file: report.json
"
    .to_string()
}
