//! Vulnerability matching driver.
//!
//! A [`Driver`] is bound to one package ecosystem: it knows the advisory
//! bucket namespace, how names are normalised for lookup and which
//! [`Comparer`] decides range membership.
//!
//! ```
//! use std::sync::Arc;
//! use sca_core::detector::{Driver, MemoryAdvisoryStore};
//! use sca_core::model::{Advisory, PkgType};
//!
//! let mut store = MemoryAdvisoryStore::new();
//! store.insert(
//!     "npm::GitHub Security Advisory npm",
//!     "lodash",
//!     Advisory::new("CVE-2021-23337").vulnerable(["<4.17.21"]),
//! );
//!
//! let driver = Driver::new(PkgType::Npm, Arc::new(store)).unwrap();
//! let vulns = driver.detect_vulnerabilities("lodash@4.17.20", "lodash", "4.17.20").unwrap();
//! assert_eq!(vulns[0].fixed_version, "4.17.21");
//! ```

mod advisory;
pub mod compare;

pub use advisory::{AdvisorySource, MemoryAdvisoryStore};
pub use compare::{Comparer, ConstraintError};

use crate::error::{ErrorContext, Result};
use crate::model::{Advisory, DetectedVulnerability, PkgType};
use compare::{GenericComparer, MavenComparer, NpmComparer, Pep440Comparer, RubyGemsComparer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Advisory namespace of a package ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    RubyGems,
    Cargo,
    Composer,
    Go,
    Maven,
    Npm,
    NuGet,
    Pip,
    Pub,
    Erlang,
    Conan,
    Swift,
    Cocoapods,
    Bitnami,
    K8s,
}

impl Ecosystem {
    /// Ecosystem for a package type, if it can be scanned.
    #[must_use]
    pub const fn for_pkg_type(pkg_type: PkgType) -> Option<Self> {
        let ecosystem = match pkg_type {
            PkgType::Gem => Self::RubyGems,
            PkgType::Cargo => Self::Cargo,
            PkgType::Composer => Self::Composer,
            PkgType::Golang => Self::Go,
            PkgType::Maven => Self::Maven,
            PkgType::Npm => Self::Npm,
            PkgType::Nuget => Self::NuGet,
            PkgType::Pypi => Self::Pip,
            PkgType::Pub => Self::Pub,
            PkgType::Hex => Self::Erlang,
            PkgType::Conan => Self::Conan,
            PkgType::Swift => Self::Swift,
            PkgType::Cocoapods => Self::Cocoapods,
            PkgType::Bitnami => Self::Bitnami,
            PkgType::K8s => Self::K8s,
            PkgType::Conda
            | PkgType::Apk
            | PkgType::Deb
            | PkgType::Rpm
            | PkgType::Oci => return None,
        };
        Some(ecosystem)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RubyGems => "rubygems",
            Self::Cargo => "cargo",
            Self::Composer => "composer",
            Self::Go => "go",
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::NuGet => "nuget",
            Self::Pip => "pip",
            Self::Pub => "pub",
            Self::Erlang => "erlang",
            Self::Conan => "conan",
            Self::Swift => "swift",
            Self::Cocoapods => "cocoapods",
            Self::Bitnami => "bitnami",
            Self::K8s => "k8s",
        }
    }

    /// The comparer for this ecosystem's version syntax.
    #[must_use]
    pub fn comparer(self) -> &'static dyn Comparer {
        match self {
            Self::RubyGems | Self::Cocoapods => &RubyGemsComparer,
            Self::Maven => &MavenComparer,
            Self::Npm => &NpmComparer,
            Self::Pip => &Pep440Comparer,
            Self::Cargo
            | Self::Composer
            | Self::Go
            | Self::NuGet
            | Self::Pub
            | Self::Erlang
            | Self::Conan
            | Self::Swift
            | Self::Bitnami
            | Self::K8s => &GenericComparer,
        }
    }

    /// Package name as stored in advisory buckets.
    #[must_use]
    pub fn normalize_name(self, name: &str) -> String {
        match self {
            Self::Pip => name.to_lowercase().replace('_', "-"),
            _ => name.to_string(),
        }
    }

    /// Bucket prefix, e.g. `"pip::"`.
    #[must_use]
    pub fn bucket_prefix(self) -> String {
        format!("{}::", self.as_str())
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matches packages of one ecosystem against an advisory source.
///
/// Immutable once built; share it across threads freely.
#[derive(Clone)]
pub struct Driver {
    ecosystem: Ecosystem,
    comparer: &'static dyn Comparer,
    source: Arc<dyn AdvisorySource>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("ecosystem", &self.ecosystem)
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Driver for `pkg_type`, or `None` when that type cannot be scanned.
    pub fn new(pkg_type: PkgType, source: Arc<dyn AdvisorySource>) -> Option<Self> {
        let Some(ecosystem) = Ecosystem::for_pkg_type(pkg_type) else {
            if pkg_type == PkgType::Conda {
                warn!("Conda package is supported for SBOM, not for vulnerability scanning");
            } else {
                warn!("The {pkg_type} package type is not supported for vulnerability scanning");
            }
            return None;
        };
        Some(Self {
            ecosystem,
            comparer: ecosystem.comparer(),
            source,
        })
    }

    /// Driver for a package type given by name; unknown names yield `None`.
    pub fn from_type_name(name: &str, source: Arc<dyn AdvisorySource>) -> Option<Self> {
        match PkgType::from_purl_type(name) {
            Some(pkg_type) => Self::new(pkg_type, source),
            None => {
                warn!("The {name:?} package type is not supported for vulnerability scanning");
                None
            }
        }
    }

    #[must_use]
    pub const fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    /// Advisories that apply to `version` of package `name`, in source order.
    pub fn detect_vulnerabilities(
        &self,
        pkg_id: &str,
        name: &str,
        version: &str,
    ) -> Result<Vec<DetectedVulnerability>> {
        let prefix = self.ecosystem.bucket_prefix();
        let advisories = self
            .source
            .get_advisories(&prefix, &self.ecosystem.normalize_name(name))
            .with_context(|| format!("failed to get {} advisories", self.ecosystem))?;

        let vulns: Vec<_> = advisories
            .into_iter()
            .filter(|adv| self.comparer.is_vulnerable(version, adv))
            .map(|adv| DetectedVulnerability {
                fixed_version: create_fixed_versions(&adv),
                vulnerability_id: adv.vulnerability_id,
                pkg_id: pkg_id.to_string(),
                pkg_name: name.to_string(),
                installed_version: version.to_string(),
                data_source: adv.data_source,
            })
            .collect();

        debug!(
            ecosystem = %self.ecosystem,
            package = name,
            version,
            found = vulns.len(),
            "Detected vulnerabilities"
        );
        Ok(vulns)
    }
}

/// Fixed-version text for an advisory.
///
/// Patched versions win when present. Otherwise every strict upper bound
/// (`<x`, not `<=x`) in the vulnerable ranges contributes `x`; the result
/// may be empty.
#[must_use]
pub fn create_fixed_versions(advisory: &Advisory) -> String {
    if !advisory.patched_versions.is_empty() {
        return advisory.patched_versions.join(", ");
    }

    advisory
        .vulnerable_versions
        .iter()
        .flat_map(|range| range.split(','))
        .map(str::trim)
        .filter(|term| term.starts_with('<') && !term.starts_with("<="))
        .map(|term| term.trim_start_matches('<').trim())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdvisoryErrorKind, ScaError};
    use crate::model::DataSource;

    struct FailingSource;

    impl AdvisorySource for FailingSource {
        fn get_advisories(&self, _prefix: &str, _name: &str) -> Result<Vec<Advisory>> {
            Err(ScaError::advisory(
                "bolt",
                AdvisoryErrorKind::Query("database closed".into()),
            ))
        }
    }

    fn store() -> Arc<MemoryAdvisoryStore> {
        let mut store = MemoryAdvisoryStore::new();
        store.insert(
            "pip::GitHub Security Advisory pip",
            "django-test",
            Advisory::new("CVE-2023-0001")
                .vulnerable([">=3.0, <3.2.19"])
                .patched(["3.2.19"]),
        );
        store.insert(
            "pip::GitHub Security Advisory pip",
            "django-test",
            Advisory::new("CVE-2023-0002").vulnerable(["<2.0"]),
        );
        store.insert(
            "npm::GitHub Security Advisory npm",
            "lodash",
            Advisory::new("CVE-2021-23337").vulnerable(["<4.17.21"]),
        );
        Arc::new(store)
    }

    #[test]
    fn test_fixed_version_from_vulnerable_ranges() {
        let advisory = Advisory::new("CVE-1").vulnerable(["<1.2.0", ">=0.5.0,<1.2.0"]);
        assert_eq!(create_fixed_versions(&advisory), "1.2.0, 1.2.0");
    }

    #[test]
    fn test_fixed_version_prefers_patched() {
        let advisory = Advisory::new("CVE-1")
            .vulnerable(["<1.0.0"])
            .patched(["1.2.0", "1.3.0"]);
        assert_eq!(create_fixed_versions(&advisory), "1.2.0, 1.3.0");
    }

    #[test]
    fn test_fixed_version_ignores_inclusive_bounds() {
        let advisory = Advisory::new("CVE-1").vulnerable(["<=1.2.0", ">=0.5.0"]);
        assert_eq!(create_fixed_versions(&advisory), "");
    }

    #[test]
    fn test_driver_rejects_conda_and_os_types() {
        let source: Arc<dyn AdvisorySource> = store();
        assert!(Driver::new(PkgType::Conda, Arc::clone(&source)).is_none());
        assert!(Driver::new(PkgType::Rpm, Arc::clone(&source)).is_none());
        assert!(Driver::from_type_name("unknown", source).is_none());
    }

    #[test]
    fn test_ecosystem_names() {
        let source: Arc<dyn AdvisorySource> = store();
        let eco = |t| Driver::new(t, Arc::clone(&source)).map(|d| d.ecosystem().as_str());
        assert_eq!(eco(PkgType::Gem), Some("rubygems"));
        assert_eq!(eco(PkgType::Golang), Some("go"));
        assert_eq!(eco(PkgType::Pypi), Some("pip"));
        assert_eq!(eco(PkgType::Hex), Some("erlang"));
        assert_eq!(eco(PkgType::K8s), Some("k8s"));
    }

    #[test]
    fn test_detect_normalizes_pip_names() {
        let driver = Driver::new(PkgType::Pypi, store()).expect("pip driver");
        let vulns = driver
            .detect_vulnerabilities("Django_test@3.1.0", "Django_test", "3.1.0")
            .expect("ok");
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].vulnerability_id, "CVE-2023-0001");
        assert_eq!(vulns[0].pkg_name, "Django_test");
        assert_eq!(vulns[0].fixed_version, "3.2.19");
    }

    #[test]
    fn test_detect_keeps_advisory_order() {
        let mut store = MemoryAdvisoryStore::new();
        for id in ["GHSA-b", "GHSA-a", "GHSA-c"] {
            store.insert(
                "cargo::RustSec",
                "smallvec",
                Advisory::new(id).vulnerable(["<1.6.1"]),
            );
        }
        let driver = Driver::new(PkgType::Cargo, Arc::new(store)).expect("cargo driver");
        let ids: Vec<_> = driver
            .detect_vulnerabilities("", "smallvec", "1.6.0")
            .expect("ok")
            .into_iter()
            .map(|v| v.vulnerability_id)
            .collect();
        assert_eq!(ids, vec!["GHSA-b", "GHSA-a", "GHSA-c"]);
    }

    #[test]
    fn test_detect_passes_data_source_through() {
        let mut store = MemoryAdvisoryStore::new();
        let mut advisory = Advisory::new("CVE-2022-1").vulnerable(["<2.0.0"]);
        advisory.data_source = Some(DataSource {
            id: "rubysec".into(),
            name: "Ruby Advisory Database".into(),
            url: "https://github.com/rubysec/ruby-advisory-db".into(),
        });
        store.insert("rubygems::ruby-advisory-db", "rack", advisory.clone());
        let driver = Driver::new(PkgType::Gem, Arc::new(store)).expect("gem driver");

        let vulns = driver
            .detect_vulnerabilities("rack@1.6.0", "rack", "1.6.0")
            .expect("ok");
        assert_eq!(vulns[0].data_source, advisory.data_source);
        assert_eq!(vulns[0].pkg_id, "rack@1.6.0");
    }

    #[test]
    fn test_query_failure_is_propagated() {
        let driver = Driver::new(PkgType::Npm, Arc::new(FailingSource)).expect("npm driver");
        let err = driver
            .detect_vulnerabilities("", "lodash", "4.17.20")
            .expect_err("query failure");
        assert!(err.to_string().contains("failed to get npm advisories"));
    }
}
