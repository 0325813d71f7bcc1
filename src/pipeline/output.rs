//! Writing JSON results to stdout or a file.

use crate::config::OutputConfig;
use crate::error::{Result, ScaError};
use serde::Serialize;
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// Serialize `value` as JSON, pretty-printed when configured.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Serialize `value` and write it where `config` points.
pub fn write_json<T: Serialize>(value: &T, config: &OutputConfig) -> Result<()> {
    let content = to_json(value, config.pretty)?;
    write_output(&content, &OutputTarget::from_option(config.file.clone()))
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content).map_err(|e| ScaError::io(path, e))?;
            tracing::info!("Output written to {}", path.display());
            Ok(())
        }
    }
}
