//! SBOM tree → identifiers → vulnerabilities.

use crate::config::DetectionConfig;
use crate::detector::{AdvisorySource, Driver};
use crate::error::{ErrorContext, Result};
use crate::model::{
    DetectedVulnerability, LangType, Metadata, Os, Package, PackageInfo, PkgType, Sbom,
};
use crate::purl::PackageUrl;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Whether an application's libraries were matched against advisories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scanned,
    /// Excluded through `detection.skip_ecosystems`
    Skipped,
    /// No driver exists for the package type
    Unsupported,
}

/// Outcome for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationResult {
    pub src_type: LangType,
    pub pkg_type: Option<PkgType>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_path: String,
    pub status: MatchStatus,
    /// Libraries with their identifiers filled in
    pub packages: Vec<Package>,
    pub vulnerabilities: Vec<DetectedVulnerability>,
}

/// Result of scanning one SBOM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    /// OS packages, identified but not matched
    pub os_packages: Vec<PackageInfo>,
    pub results: Vec<ApplicationResult>,
}

impl ScanReport {
    /// Total number of detected vulnerabilities.
    #[must_use]
    pub fn vulnerability_count(&self) -> usize {
        self.results.iter().map(|r| r.vulnerabilities.len()).sum()
    }

    /// All detected vulnerabilities in application order.
    pub fn vulnerabilities(&self) -> impl Iterator<Item = &DetectedVulnerability> {
        self.results.iter().flat_map(|r| r.vulnerabilities.iter())
    }
}

/// Scan a reconstructed SBOM against `source`.
///
/// One driver is built per application package type. Packages inside an
/// application are independent and are matched in parallel unless
/// `config.parallel` is off. An advisory-source failure or corrupt
/// identifier aborts the scan; unsupported ecosystems only mark the
/// application as such.
pub fn scan_sbom(
    sbom: &Sbom,
    source: Arc<dyn AdvisorySource>,
    config: &DetectionConfig,
) -> Result<ScanReport> {
    let metadata = sbom.os.clone().map(Metadata::with_os).unwrap_or_default();

    let mut os_packages = sbom.packages.clone();
    if let Some(pkg_type) = sbom.os.as_ref().and_then(|os| os.family.pkg_type()) {
        for pkg in os_packages.iter_mut().flat_map(|info| info.packages.iter_mut()) {
            assign_identifier(pkg, None, pkg_type, &metadata)?;
        }
    }

    let mut drivers: HashMap<PkgType, Option<Driver>> = HashMap::new();
    let mut results = Vec::with_capacity(sbom.applications.len());
    for app in &sbom.applications {
        let mut packages = app.packages.clone();
        if let Some(pkg_type) = app.pkg_type {
            for pkg in &mut packages {
                assign_identifier(pkg, Some(&app.src_type), pkg_type, &metadata)?;
            }
        }

        let (status, driver) = match app.pkg_type {
            Some(pkg_type) if config.skips(pkg_type) => (MatchStatus::Skipped, None),
            Some(pkg_type) => {
                let driver = drivers
                    .entry(pkg_type)
                    .or_insert_with(|| Driver::new(pkg_type, Arc::clone(&source)))
                    .clone();
                match driver {
                    Some(driver) => (MatchStatus::Scanned, Some(driver)),
                    None => (MatchStatus::Unsupported, None),
                }
            }
            None => (MatchStatus::Unsupported, None),
        };

        let vulnerabilities = match &driver {
            Some(driver) => detect_all(driver, &packages, config.parallel)
                .with_context(|| format!("failed to scan {} application", app.src_type))?,
            None => {
                debug!(src_type = %app.src_type, ?status, "Application not matched");
                Vec::new()
            }
        };

        results.push(ApplicationResult {
            src_type: app.src_type.clone(),
            pkg_type: app.pkg_type,
            file_path: app.file_path.clone(),
            status,
            packages,
            vulnerabilities,
        });
    }

    let report = ScanReport {
        os: sbom.os.clone(),
        os_packages,
        results,
    };
    info!(
        applications = report.results.len(),
        vulnerabilities = report.vulnerability_count(),
        "Scan complete"
    );
    Ok(report)
}

fn assign_identifier(
    pkg: &mut Package,
    src_type: Option<&LangType>,
    pkg_type: PkgType,
    metadata: &Metadata,
) -> Result<()> {
    if pkg.identifier.is_some() {
        return Ok(());
    }
    let purl = match src_type {
        Some(src_type) => PackageUrl::encode_application(src_type, pkg_type, metadata, pkg),
        None => PackageUrl::encode(pkg_type, metadata, pkg),
    };
    pkg.identifier = purl
        .with_context(|| format!("failed to encode identifier for {}", pkg.name))?
        .map(|purl| purl.as_str().to_string());
    Ok(())
}

fn detect_all(
    driver: &Driver,
    packages: &[Package],
    parallel: bool,
) -> Result<Vec<DetectedVulnerability>> {
    let detect = |pkg: &Package| {
        driver.detect_vulnerabilities(&package_id(pkg), &pkg.name, &pkg.formatted_version())
    };
    let per_package: Vec<Vec<DetectedVulnerability>> = if parallel {
        packages.par_iter().map(detect).collect::<Result<_>>()?
    } else {
        packages.iter().map(detect).collect::<Result<_>>()?
    };
    Ok(per_package.into_iter().flatten().collect())
}

fn package_id(pkg: &Package) -> String {
    if pkg.id.is_empty() {
        format!("{}@{}", pkg.name, pkg.version)
    } else {
        pkg.id.clone()
    }
}
