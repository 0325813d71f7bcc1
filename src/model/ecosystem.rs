//! Ecosystem tags: package types, application source types and OS families.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A package-manager family. Each variant equals its PURL type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PkgType {
    Apk,
    Deb,
    Rpm,
    Cargo,
    Cocoapods,
    Composer,
    Conan,
    Conda,
    Gem,
    Golang,
    Hex,
    Maven,
    Npm,
    Nuget,
    Pub,
    Pypi,
    Swift,
    Bitnami,
    Oci,
    /// Kubernetes components (`pkg:k8s/<provider>/<component>`)
    K8s,
}

impl PkgType {
    /// Every supported package type.
    pub const ALL: [Self; 20] = [
        Self::Apk,
        Self::Deb,
        Self::Rpm,
        Self::Cargo,
        Self::Cocoapods,
        Self::Composer,
        Self::Conan,
        Self::Conda,
        Self::Gem,
        Self::Golang,
        Self::Hex,
        Self::Maven,
        Self::Npm,
        Self::Nuget,
        Self::Pub,
        Self::Pypi,
        Self::Swift,
        Self::Bitnami,
        Self::Oci,
        Self::K8s,
    ];

    /// Parse a PURL type. Unsupported types yield `None`.
    #[must_use]
    pub fn from_purl_type(purl_type: &str) -> Option<Self> {
        let purl_type = purl_type.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == purl_type)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apk => "apk",
            Self::Deb => "deb",
            Self::Rpm => "rpm",
            Self::Cargo => "cargo",
            Self::Cocoapods => "cocoapods",
            Self::Composer => "composer",
            Self::Conan => "conan",
            Self::Conda => "conda",
            Self::Gem => "gem",
            Self::Golang => "golang",
            Self::Hex => "hex",
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Nuget => "nuget",
            Self::Pub => "pub",
            Self::Pypi => "pypi",
            Self::Swift => "swift",
            Self::Bitnami => "bitnami",
            Self::Oci => "oci",
            Self::K8s => "k8s",
        }
    }

    /// True for operating-system package managers.
    #[must_use]
    pub const fn os_pkg(self) -> bool {
        matches!(self, Self::Apk | Self::Deb | Self::Rpm)
    }
}

impl fmt::Display for PkgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tool or manifest kind an application was discovered from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LangType {
    Bundler,
    GemSpec,
    Cargo,
    RustBinary,
    Composer,
    Npm,
    Yarn,
    Pnpm,
    NodePkg,
    JavaScript,
    NuGet,
    DotNetCore,
    Pip,
    Pipenv,
    Poetry,
    PythonPkg,
    CondaPkg,
    Jar,
    Pom,
    Gradle,
    GoBinary,
    GoModule,
    Conan,
    Cocoapods,
    Swift,
    Pub,
    Hex,
    K8sUpstream,
    Eks,
    Gke,
    Aks,
    Rke,
    Ocp,
    /// Packages recovered from an SBOM without an owning application
    Sbom,
    Other(String),
}

impl LangType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bundler => "bundler",
            Self::GemSpec => "gemspec",
            Self::Cargo => "cargo",
            Self::RustBinary => "rustbinary",
            Self::Composer => "composer",
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::NodePkg => "node-pkg",
            Self::JavaScript => "javascript",
            Self::NuGet => "nuget",
            Self::DotNetCore => "dotnet-core",
            Self::Pip => "pip",
            Self::Pipenv => "pipenv",
            Self::Poetry => "poetry",
            Self::PythonPkg => "python-pkg",
            Self::CondaPkg => "conda-pkg",
            Self::Jar => "jar",
            Self::Pom => "pom",
            Self::Gradle => "gradle",
            Self::GoBinary => "gobinary",
            Self::GoModule => "gomod",
            Self::Conan => "conan",
            Self::Cocoapods => "cocoapods",
            Self::Swift => "swift",
            Self::Pub => "pub",
            Self::Hex => "hex",
            Self::K8sUpstream => "kubernetes",
            Self::Eks => "eks",
            Self::Gke => "gke",
            Self::Aks => "aks",
            Self::Rke => "rke",
            Self::Ocp => "ocp",
            Self::Sbom => "sbom",
            Self::Other(s) => s,
        }
    }

    /// The package ecosystem libraries of this application belong to.
    ///
    /// Conda packages are matched against PyPI since no conda advisories
    /// exist. Unmapped source types fall back to a package type of the same
    /// name, if there is one.
    #[must_use]
    pub fn pkg_type(&self) -> Option<PkgType> {
        let pkg_type = match self {
            Self::Bundler | Self::GemSpec => PkgType::Gem,
            Self::Cargo | Self::RustBinary => PkgType::Cargo,
            Self::Composer => PkgType::Composer,
            Self::Npm | Self::Yarn | Self::Pnpm | Self::JavaScript | Self::NodePkg => PkgType::Npm,
            Self::NuGet | Self::DotNetCore => PkgType::Nuget,
            Self::Pip | Self::Pipenv | Self::Poetry | Self::PythonPkg | Self::CondaPkg => {
                PkgType::Pypi
            }
            Self::Pom | Self::Gradle | Self::Jar => PkgType::Maven,
            Self::GoBinary | Self::GoModule => PkgType::Golang,
            Self::Conan => PkgType::Conan,
            Self::Cocoapods => PkgType::Cocoapods,
            Self::Swift => PkgType::Swift,
            Self::Pub => PkgType::Pub,
            Self::Hex => PkgType::Hex,
            Self::K8sUpstream | Self::Eks | Self::Gke | Self::Aks | Self::Rke | Self::Ocp => {
                PkgType::K8s
            }
            Self::Sbom => return None,
            Self::Other(s) => {
                return OsFamily::from(s.as_str())
                    .pkg_type()
                    .or_else(|| PkgType::from_purl_type(s))
            }
        };
        Some(pkg_type)
    }

    /// False for application kinds that are not tied to a single manifest file.
    #[must_use]
    pub const fn is_file_scoped(&self) -> bool {
        !matches!(
            self,
            Self::NodePkg | Self::PythonPkg | Self::GemSpec | Self::Jar | Self::CondaPkg
        )
    }
}

impl From<&str> for LangType {
    fn from(s: &str) -> Self {
        match s {
            "bundler" => Self::Bundler,
            "gemspec" => Self::GemSpec,
            "cargo" => Self::Cargo,
            "rustbinary" => Self::RustBinary,
            "composer" => Self::Composer,
            "npm" => Self::Npm,
            "yarn" => Self::Yarn,
            "pnpm" => Self::Pnpm,
            "node-pkg" => Self::NodePkg,
            "javascript" => Self::JavaScript,
            "nuget" => Self::NuGet,
            "dotnet-core" => Self::DotNetCore,
            "pip" => Self::Pip,
            "pipenv" => Self::Pipenv,
            "poetry" => Self::Poetry,
            "python-pkg" => Self::PythonPkg,
            "conda-pkg" => Self::CondaPkg,
            "jar" => Self::Jar,
            "pom" => Self::Pom,
            "gradle" => Self::Gradle,
            "gobinary" => Self::GoBinary,
            "gomod" => Self::GoModule,
            "conan" => Self::Conan,
            "cocoapods" => Self::Cocoapods,
            "swift" => Self::Swift,
            "pub" => Self::Pub,
            "hex" => Self::Hex,
            "kubernetes" => Self::K8sUpstream,
            "eks" => Self::Eks,
            "gke" => Self::Gke,
            "aks" => Self::Aks,
            "rke" => Self::Rke,
            "ocp" => Self::Ocp,
            "sbom" => Self::Sbom,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for LangType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<LangType> for String {
    fn from(t: LangType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for LangType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OsFamily {
    Alma,
    Alpine,
    Amazon,
    CblMariner,
    CentOs,
    Chainguard,
    Debian,
    Fedora,
    OpenSuse,
    OpenSuseLeap,
    OpenSuseTumbleweed,
    Oracle,
    Photon,
    RedHat,
    Rocky,
    Sles,
    Ubuntu,
    Wolfi,
    Other(String),
}

impl OsFamily {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Alma => "alma",
            Self::Alpine => "alpine",
            Self::Amazon => "amazon",
            Self::CblMariner => "cbl-mariner",
            Self::CentOs => "centos",
            Self::Chainguard => "chainguard",
            Self::Debian => "debian",
            Self::Fedora => "fedora",
            Self::OpenSuse => "opensuse",
            Self::OpenSuseLeap => "opensuse.leap",
            Self::OpenSuseTumbleweed => "opensuse.tumbleweed",
            Self::Oracle => "oracle",
            Self::Photon => "photon",
            Self::RedHat => "redhat",
            Self::Rocky => "rocky",
            Self::Sles => "suse linux enterprise server",
            Self::Ubuntu => "ubuntu",
            Self::Wolfi => "wolfi",
            Self::Other(s) => s,
        }
    }

    /// Whitespace-free form usable as a PURL namespace or qualifier token.
    #[must_use]
    pub fn purl_token(&self) -> &str {
        match self {
            Self::Sles => "sles",
            other => other.as_str(),
        }
    }

    /// The OS package manager used by this family, if known.
    #[must_use]
    pub const fn pkg_type(&self) -> Option<PkgType> {
        match self {
            Self::Alpine | Self::Chainguard | Self::Wolfi => Some(PkgType::Apk),
            Self::Alma
            | Self::Amazon
            | Self::CblMariner
            | Self::CentOs
            | Self::Fedora
            | Self::OpenSuse
            | Self::OpenSuseLeap
            | Self::OpenSuseTumbleweed
            | Self::Oracle
            | Self::Photon
            | Self::RedHat
            | Self::Rocky
            | Self::Sles => Some(PkgType::Rpm),
            Self::Debian | Self::Ubuntu => Some(PkgType::Deb),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for OsFamily {
    fn from(s: &str) -> Self {
        match s {
            "alma" => Self::Alma,
            "alpine" => Self::Alpine,
            "amazon" => Self::Amazon,
            "cbl-mariner" => Self::CblMariner,
            "centos" => Self::CentOs,
            "chainguard" => Self::Chainguard,
            "debian" => Self::Debian,
            "fedora" => Self::Fedora,
            "opensuse" => Self::OpenSuse,
            "opensuse.leap" => Self::OpenSuseLeap,
            "opensuse.tumbleweed" => Self::OpenSuseTumbleweed,
            "oracle" => Self::Oracle,
            "photon" => Self::Photon,
            "redhat" => Self::RedHat,
            "rocky" => Self::Rocky,
            "suse linux enterprise server" | "sles" => Self::Sles,
            "ubuntu" => Self::Ubuntu,
            "wolfi" => Self::Wolfi,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for OsFamily {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<OsFamily> for String {
    fn from(f: OsFamily) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pkg_type_from_purl_type() {
        assert_eq!(PkgType::from_purl_type("npm"), Some(PkgType::Npm));
        assert_eq!(PkgType::from_purl_type("PyPI"), Some(PkgType::Pypi));
        assert_eq!(PkgType::from_purl_type("k8s"), Some(PkgType::K8s));
        assert_eq!(PkgType::from_purl_type("hackage"), None);
        assert_eq!(PkgType::from_purl_type(""), None);
    }

    #[test]
    fn test_os_pkg() {
        let os: Vec<_> = PkgType::ALL.into_iter().filter(|t| t.os_pkg()).collect();
        assert_eq!(os, vec![PkgType::Apk, PkgType::Deb, PkgType::Rpm]);
    }

    #[test]
    fn test_lang_type_pkg_type() {
        assert_eq!(LangType::Yarn.pkg_type(), Some(PkgType::Npm));
        assert_eq!(LangType::CondaPkg.pkg_type(), Some(PkgType::Pypi));
        assert_eq!(LangType::Gradle.pkg_type(), Some(PkgType::Maven));
        assert_eq!(LangType::Eks.pkg_type(), Some(PkgType::K8s));
        assert_eq!(LangType::Sbom.pkg_type(), None);
        assert_eq!(LangType::from("bitnami").pkg_type(), Some(PkgType::Bitnami));
        assert_eq!(LangType::from("ubuntu").pkg_type(), Some(PkgType::Deb));
        assert_eq!(LangType::from("made-up").pkg_type(), None);
    }

    #[test]
    fn test_lang_type_string_forms() {
        for s in ["node-pkg", "dotnet-core", "gomod", "kubernetes", "whatever"] {
            assert_eq!(LangType::from(s).as_str(), s);
        }
    }

    #[test]
    fn test_os_family_sles_token() {
        let sles = OsFamily::from("suse linux enterprise server");
        assert_eq!(sles, OsFamily::Sles);
        assert_eq!(sles.purl_token(), "sles");
        assert_eq!(OsFamily::RedHat.purl_token(), "redhat");
        assert_eq!(sles.pkg_type(), Some(PkgType::Rpm));
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        let json = serde_json::to_string(&(PkgType::Pypi, LangType::NodePkg, OsFamily::Sles))
            .expect("serialize");
        assert_eq!(json, r#"["pypi","node-pkg","suse linux enterprise server"]"#);
    }
}
