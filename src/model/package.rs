//! Package records and the OS/Application/Package tree.

use super::ecosystem::{LangType, OsFamily, PkgType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Origin layer of a package inside a container image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub digest: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub diff_id: String,
}

impl Layer {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digest.is_empty() && self.diff_id.is_empty()
    }
}

/// A single installed package as reported by an analyzer or an SBOM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Opaque `name@version` style key
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub epoch: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub arch: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src_release: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub src_epoch: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modularity_label: String,
    /// Location within the artifact
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg_type: Option<PkgType>,
    /// Canonical identifier text, when one could be produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Layer::is_empty")]
    pub layer: Layer,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Package {
    /// Create a package with just a name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// `[epoch:]version[-release]`
    #[must_use]
    pub fn formatted_version(&self) -> String {
        crate::utils::format_version(self.epoch, &self.version, &self.release)
    }

    /// Ordering used for deterministic library lists: name, version, file path.
    #[must_use]
    pub fn cmp_identity(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.file_path.cmp(&other.file_path))
    }
}

/// Operating system detected in an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Os {
    pub family: OsFamily,
    pub name: String,
}

impl Os {
    pub fn new(family: impl Into<OsFamily>, name: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            name: name.into(),
        }
    }
}

/// Subset of a container image configuration consulted for identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub architecture: String,
}

/// Artifact-level context passed alongside a package when encoding identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub os: Option<Os>,
    pub repo_digests: Vec<String>,
    pub image_config: ImageConfig,
}

impl Metadata {
    #[must_use]
    pub fn with_os(os: Os) -> Self {
        Self {
            os: Some(os),
            ..Self::default()
        }
    }
}

/// OS packages discovered from one file (e.g. a dpkg status file).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_path: String,
    pub packages: Vec<Package>,
}

/// Libraries sharing one discovery mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub src_type: LangType,
    pub pkg_type: Option<PkgType>,
    /// Manifest location; empty when not file-scoped
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_path: String,
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Application {
    #[must_use]
    pub fn new(src_type: LangType) -> Self {
        let pkg_type = src_type.pkg_type();
        Self {
            src_type,
            pkg_type,
            file_path: String::new(),
            packages: Vec::new(),
        }
    }
}

/// Package tree reconstructed from an SBOM document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sbom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    pub packages: Vec<PackageInfo>,
    pub applications: Vec<Application>,
}

impl Sbom {
    /// Total number of packages across OS groups and applications.
    #[must_use]
    pub fn package_count(&self) -> usize {
        self.packages.iter().map(|p| p.packages.len()).sum::<usize>()
            + self
                .applications
                .iter()
                .map(|a| a.packages.len())
                .sum::<usize>()
    }

    /// All OS packages in group order.
    pub fn os_packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().flat_map(|p| p.packages.iter())
    }

    /// Application for the given package type, if any.
    #[must_use]
    pub fn application(&self, pkg_type: PkgType) -> Option<&Application> {
        self.applications
            .iter()
            .find(|a| a.pkg_type == Some(pkg_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_version() {
        let mut pkg = Package::new("acl", "2.2.53");
        assert_eq!(pkg.formatted_version(), "2.2.53");
        pkg.release = "1.el8".into();
        assert_eq!(pkg.formatted_version(), "2.2.53-1.el8");
        pkg.epoch = 1;
        assert_eq!(pkg.formatted_version(), "1:2.2.53-1.el8");
    }

    #[test]
    fn test_cmp_identity() {
        let mut pkgs = vec![
            Package::new("zlib", "1.0"),
            Package::new("acl", "2.0"),
            Package::new("acl", "1.0"),
        ];
        pkgs.sort_by(Package::cmp_identity);
        let names: Vec<_> = pkgs.iter().map(|p| (p.name.as_str(), p.version.as_str())).collect();
        assert_eq!(names, vec![("acl", "1.0"), ("acl", "2.0"), ("zlib", "1.0")]);
    }

    #[test]
    fn test_package_count() {
        let mut sbom = Sbom::default();
        sbom.packages.push(PackageInfo {
            file_path: String::new(),
            packages: vec![Package::new("musl", "1.2.3")],
        });
        let mut app = Application::new(LangType::Npm);
        app.packages.push(Package::new("lodash", "4.17.21"));
        app.packages.push(Package::new("express", "4.18.2"));
        sbom.applications.push(app);

        assert_eq!(sbom.package_count(), 3);
        assert!(sbom.application(PkgType::Npm).is_some());
        assert!(sbom.application(PkgType::Pypi).is_none());
    }

    #[test]
    fn test_empty_fields_are_not_serialized() {
        let json = serde_json::to_value(Package::new("lodash", "4.17.21")).expect("serialize");
        assert_eq!(json, serde_json::json!({"name": "lodash", "version": "4.17.21"}));
    }
}
