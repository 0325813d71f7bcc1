//! `sbom` and `scan` command handlers.

use crate::config::{OutputConfig, ScaConfig, Validatable};
use crate::detector::{AdvisorySource, MemoryAdvisoryStore};
use crate::parsers::parse_sbom;
use crate::pipeline::{exit_codes, scan_sbom, write_json, ScanReport};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Run the sbom command: reconstruct the package tree and print it.
pub fn run_sbom(sbom_path: &Path, output: &OutputConfig) -> Result<()> {
    let sbom = parse_sbom(sbom_path)
        .with_context(|| format!("failed to ingest {}", sbom_path.display()))?;
    tracing::info!(
        applications = sbom.applications.len(),
        packages = sbom.package_count(),
        "Reconstructed package tree"
    );
    write_json(&sbom, output)?;
    Ok(())
}

/// Parse, identify and match one SBOM file.
pub fn scan_file(sbom_path: &Path, config: &ScaConfig) -> Result<ScanReport> {
    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", messages.join("\n  "));
    }

    let Some(db_path) = config.advisories.db_path.as_deref() else {
        bail!("No advisory database configured; pass --advisories or set advisories.db_path");
    };
    let store = MemoryAdvisoryStore::load(db_path)
        .with_context(|| format!("failed to load advisories from {}", db_path.display()))?;
    tracing::debug!(advisories = store.advisory_count(), "Advisory database ready");
    let source: Arc<dyn AdvisorySource> = Arc::new(store);

    let sbom = parse_sbom(sbom_path)
        .with_context(|| format!("failed to ingest {}", sbom_path.display()))?;
    Ok(scan_sbom(&sbom, source, &config.detection)?)
}

/// Run the scan command, returning the process exit code.
pub fn run_scan(sbom_path: PathBuf, config: &ScaConfig, fail_on_vuln: bool) -> Result<i32> {
    let report = scan_file(&sbom_path, config)?;
    write_json(&report, &config.output)?;

    if fail_on_vuln && report.vulnerability_count() > 0 {
        return Ok(exit_codes::VULNERABILITIES_FOUND);
    }
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdvisoryConfig;

    #[test]
    fn test_scan_requires_database() {
        let err = scan_file(Path::new("sbom.spdx.json"), &ScaConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No advisory database"));
    }

    #[test]
    fn test_scan_rejects_invalid_config() {
        let mut config = ScaConfig {
            advisories: AdvisoryConfig {
                db_path: Some(PathBuf::from("db.json")),
            },
            ..ScaConfig::default()
        };
        config.detection.skip_ecosystems.push("cobol".into());
        let err = scan_file(Path::new("sbom.spdx.json"), &config).unwrap_err();
        assert!(err.to_string().contains("cobol"));
    }
}
