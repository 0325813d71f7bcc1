//! Configuration for sca-core.
//!
//! Settings come from an optional YAML file, discovered in the working
//! directory or the user config directory, with CLI arguments layered on top.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sca_core::config::{load_or_default, ScaConfig, Validatable};
//!
//! let (config, loaded_from) = load_or_default(None);
//! assert!(config.is_valid());
//! ```
//!
//! # Configuration File
//!
//! Place a `.sca-core.yaml` file in your project root or `~/.config/sca-core/`:
//!
//! ```yaml
//! advisories:
//!   db_path: ./advisories.json
//! detection:
//!   skip_ecosystems: [conan]
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{AdvisoryConfig, DetectionConfig, OutputConfig, ScaConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};
