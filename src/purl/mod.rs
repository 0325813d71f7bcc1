//! Package identity codec.
//!
//! Maps a [`Package`] (plus artifact [`Metadata`]) to a canonical package URL
//! and back. Text rendering and parsing are delegated to the `packageurl`
//! crate, so the emitted form is the canonical one: percent-encoded segments
//! and qualifier keys in sorted order. The in-memory qualifier list keeps
//! insertion order so callers can see which rule produced which qualifier.
//!
//! ```
//! use sca_core::model::{Metadata, Os, Package, PkgType};
//! use sca_core::purl::PackageUrl;
//!
//! let mut pkg = Package::new("acl", "2.2.53");
//! pkg.release = "1.el8".into();
//! pkg.epoch = 1;
//! pkg.arch = "aarch64".into();
//!
//! let meta = Metadata::with_os(Os::new("redhat", "8"));
//! let purl = PackageUrl::encode(PkgType::Rpm, &meta, &pkg).unwrap().unwrap();
//! assert_eq!(purl.namespace(), "redhat");
//! assert_eq!(purl.version(), "2.2.53-1.el8");
//! ```

mod encode;
mod oci;

pub use oci::Digest;

use crate::error::{Result, ScaError};
use crate::model::{LangType, Metadata, Package, PkgType};
use crate::utils::RpmVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Qualifier key injected by [`PackageUrl::bom_ref`].
pub const FILE_PATH_QUALIFIER: &str = "file_path";

/// Kubernetes provider namespaces recognised in `pkg:k8s/...` identifiers.
pub const K8S_NAMESPACES: [(&str, LangType); 5] = [
    ("eks", LangType::Eks),
    ("gke", LangType::Gke),
    ("aks", LangType::Aks),
    ("rke", LangType::Rke),
    ("ocp", LangType::Ocp),
];

/// Ordered qualifier list with unique keys.
///
/// Equality ignores order.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
pub struct Qualifiers(Vec<(String, String)>);

impl Qualifiers {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a qualifier, replacing the value in place if the key exists.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a qualifier, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn sorted(&self) -> Vec<&(String, String)> {
        let mut items: Vec<_> = self.0.iter().collect();
        items.sort();
        items
    }
}

impl PartialEq for Qualifiers {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Qualifiers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut qualifiers = Self::new();
        for (k, v) in iter {
            qualifiers.push(k, v);
        }
        qualifiers
    }
}

/// How a decoded identifier should be treated by scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultClass {
    OsPkgs,
    LangPkgs,
    Unknown,
}

/// A canonical package identifier.
///
/// Built either by [`PackageUrl::encode`] or by parsing text. Empty
/// namespace, version and subpath mean "absent".
#[derive(Debug, Clone)]
pub struct PackageUrl {
    ty: String,
    namespace: String,
    name: String,
    version: String,
    qualifiers: Qualifiers,
    subpath: String,
    file_path: String,
    canonical: String,
    original: Option<String>,
}

impl PackageUrl {
    /// Build an identifier from its parts, validating them.
    pub fn new(
        ty: &str,
        namespace: &str,
        name: &str,
        version: &str,
        qualifiers: Qualifiers,
        subpath: &str,
    ) -> Result<Self> {
        let invalid = |e: packageurl::Error| {
            ScaError::invalid_purl(format!("pkg:{ty}/{namespace}/{name}"), e.to_string())
        };
        let (ty, namespace, name, version, subpath, canonical) = {
            let built = render(ty, namespace, name, version, qualifiers.iter(), subpath)
                .map_err(invalid)?;
            (
                built.ty().to_string(),
                built.namespace().unwrap_or_default().to_string(),
                built.name().to_string(),
                built.version().unwrap_or_default().to_string(),
                built.subpath().unwrap_or_default().to_string(),
                canonical_text(&built).map_err(invalid)?,
            )
        };

        Ok(Self {
            ty,
            namespace,
            name,
            version,
            qualifiers,
            subpath,
            file_path: String::new(),
            canonical,
            original: None,
        })
    }

    /// Encode a package under the rules of its ecosystem.
    ///
    /// Returns `Ok(None)` when the package has no resolvable identity, such
    /// as a Go module referenced by a local path or an image without digests.
    pub fn encode(pkg_type: PkgType, metadata: &Metadata, pkg: &Package) -> Result<Option<Self>> {
        encode::encode(pkg_type, metadata, pkg)
    }

    /// Encode a library of an application with source type `src_type`.
    ///
    /// Same as [`PackageUrl::encode`], except that k8s components of a
    /// managed distribution (`eks`, `gke`, ...) get the provider as namespace.
    pub fn encode_application(
        src_type: &LangType,
        pkg_type: PkgType,
        metadata: &Metadata,
        pkg: &Package,
    ) -> Result<Option<Self>> {
        let provider = K8S_NAMESPACES
            .iter()
            .find(|(_, lang_type)| lang_type == src_type)
            .map(|(ns, _)| *ns);
        encode::encode_in(pkg_type, provider, metadata, pkg)
    }

    /// Parse canonical identifier text.
    ///
    /// A `file_path` qualifier is lifted out of the qualifier list into
    /// [`PackageUrl::file_path`], mirroring [`PackageUrl::bom_ref`].
    pub fn parse(s: &str) -> Result<Self> {
        let parsed = packageurl::PackageUrl::from_str(s)
            .map_err(|e| ScaError::invalid_purl(s, e.to_string()))?;

        let mut pairs: Vec<(String, String)> = parsed
            .qualifiers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        pairs.sort();
        let mut qualifiers: Qualifiers = pairs.into_iter().collect();
        let file_path = qualifiers.remove(FILE_PATH_QUALIFIER).unwrap_or_default();

        let mut purl = Self::new(
            parsed.ty(),
            parsed.namespace().unwrap_or_default(),
            parsed.name(),
            parsed.version().unwrap_or_default(),
            qualifiers,
            parsed.subpath().unwrap_or_default(),
        )?;
        purl.file_path = file_path;
        purl.original = Some(s.to_string());
        Ok(purl)
    }

    /// Attach the path used to disambiguate identical identifiers.
    #[must_use]
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }

    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub const fn qualifiers(&self) -> &Qualifiers {
        &self.qualifiers
    }

    #[must_use]
    pub fn subpath(&self) -> &str {
        &self.subpath
    }

    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// The ecosystem, if the type is supported.
    #[must_use]
    pub fn pkg_type(&self) -> Option<PkgType> {
        PkgType::from_purl_type(&self.ty)
    }

    /// Canonical text without the `file_path` qualifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Reference unique within one BOM.
    ///
    /// Identical packages installed at different paths share a PURL, so the
    /// file path is appended as one more qualifier after the ecosystem ones.
    #[must_use]
    pub fn bom_ref(&self) -> String {
        if self.file_path.is_empty() {
            return self.canonical.clone();
        }
        let qualifiers = self
            .qualifiers
            .iter()
            .chain(std::iter::once((FILE_PATH_QUALIFIER, self.file_path.as_str())));
        render(
            &self.ty,
            &self.namespace,
            &self.name,
            &self.version,
            qualifiers,
            &self.subpath,
        )
        .and_then(|p| canonical_text(&p))
        .unwrap_or_else(|_| self.canonical.clone())
    }

    /// Application source type for language packages.
    #[must_use]
    pub fn lang_type(&self) -> Option<LangType> {
        let lang_type = match self.pkg_type()? {
            PkgType::Composer => LangType::Composer,
            PkgType::Maven => LangType::Jar,
            PkgType::Gem => LangType::GemSpec,
            PkgType::Conda => LangType::CondaPkg,
            PkgType::Pypi => LangType::PythonPkg,
            PkgType::Golang => LangType::GoBinary,
            PkgType::Npm => LangType::NodePkg,
            PkgType::Cargo => LangType::Cargo,
            PkgType::Nuget => LangType::NuGet,
            PkgType::Swift => LangType::Swift,
            PkgType::Cocoapods => LangType::Cocoapods,
            PkgType::Hex => LangType::Hex,
            PkgType::Conan => LangType::Conan,
            PkgType::Pub => LangType::Pub,
            PkgType::K8s => {
                if self.namespace.is_empty() {
                    return Some(LangType::K8sUpstream);
                }
                return K8S_NAMESPACES
                    .iter()
                    .find(|(ns, _)| *ns == self.namespace)
                    .map(|(_, t)| t.clone());
            }
            PkgType::Apk
            | PkgType::Deb
            | PkgType::Rpm
            | PkgType::Bitnami
            | PkgType::Oci => return None,
        };
        Some(lang_type)
    }

    #[must_use]
    pub fn class(&self) -> ResultClass {
        match self.pkg_type() {
            Some(t) if t.os_pkg() => ResultClass::OsPkgs,
            _ if self.lang_type().is_some() => ResultClass::LangPkgs,
            _ => ResultClass::Unknown,
        }
    }

    /// Decode back into a package record.
    ///
    /// Qualifiers become `arch`, `epoch` and `modularity_label`; an epoch that
    /// is not a number is ignored. Namespace and name are re-joined with the
    /// ecosystem separator, except for OS packages.
    #[must_use]
    pub fn to_package(&self) -> Package {
        let pkg_type = self.pkg_type();
        let mut pkg = Package {
            name: self.name.clone(),
            version: self.version.clone(),
            file_path: self.file_path.clone(),
            pkg_type,
            identifier: Some(
                self.original
                    .clone()
                    .unwrap_or_else(|| self.canonical.clone()),
            ),
            ..Package::default()
        };

        let mut epoch_qualifier = false;
        for (key, value) in self.qualifiers.iter() {
            match key {
                "arch" => pkg.arch = value.to_string(),
                "modularitylabel" => pkg.modularity_label = value.to_string(),
                "epoch" => {
                    if let Ok(epoch) = value.parse() {
                        pkg.epoch = epoch;
                        epoch_qualifier = true;
                    }
                }
                _ => {}
            }
        }

        match pkg_type {
            Some(PkgType::Cocoapods) if !self.subpath.is_empty() => {
                pkg.name = format!("{}/{}", self.name, self.subpath);
            }
            Some(PkgType::Rpm) => {
                let rpm = RpmVersion::parse(&self.version);
                pkg.version = rpm.version;
                pkg.release = rpm.release;
                if !epoch_qualifier {
                    pkg.epoch = rpm.epoch;
                }
            }
            _ => {}
        }

        if self.namespace.is_empty() || self.class() == ResultClass::OsPkgs {
            return pkg;
        }

        pkg.name = if pkg_type == Some(PkgType::Maven) {
            format!("{}:{}", self.namespace, pkg.name)
        } else {
            format!("{}/{}", self.namespace, pkg.name)
        };
        pkg
    }
}

fn render<'a>(
    ty: &'a str,
    namespace: &'a str,
    name: &'a str,
    version: &'a str,
    qualifiers: impl Iterator<Item = (&'a str, &'a str)>,
    subpath: &'a str,
) -> std::result::Result<packageurl::PackageUrl<'a>, packageurl::Error> {
    let mut purl = packageurl::PackageUrl::new(ty, name)?;
    if !namespace.is_empty() {
        purl.with_namespace(namespace);
    }
    if !version.is_empty() {
        purl.with_version(version);
    }
    for (key, value) in qualifiers {
        purl.add_qualifier(key, value)?;
    }
    if !subpath.is_empty() {
        purl.with_subpath(subpath)?;
    }
    Ok(purl)
}

/// Text form with `/` inside the name escaped as `%2F`.
///
/// `packageurl` writes the name segment with `/` left literal, which reads
/// back as a namespace separator (`pkg:k8s/k8s.io/apiserver`).
fn canonical_text(
    purl: &packageurl::PackageUrl<'_>,
) -> std::result::Result<String, packageurl::Error> {
    let text = purl.to_string();
    if !purl.name().contains('/') {
        return Ok(text);
    }

    let mut head = packageurl::PackageUrl::new(purl.ty().to_string(), purl.name().to_string())?;
    let bare = head.to_string();
    if let Some(namespace) = purl.namespace() {
        head.with_namespace(namespace.to_string());
    }
    // "pkg:<type>/<ns>/<name>" is a prefix of the full text
    let head = head.to_string();
    let encoded_name = bare.split_once('/').map_or("", |(_, name)| name);
    let start = head.len() - encoded_name.len();
    Ok(format!(
        "{}{}{}",
        &text[..start],
        encoded_name.replace('/', "%2F"),
        &text[head.len()..]
    ))
}

impl PartialEq for PackageUrl {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
            && self.namespace == other.namespace
            && self.name == other.name
            && self.version == other.version
            && self.qualifiers == other.qualifiers
            && self.subpath == other.subpath
    }
}

impl Eq for PackageUrl {}

impl fmt::Display for PackageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for PackageUrl {
    type Err = ScaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maven() {
        let purl = PackageUrl::parse("pkg:maven/org.springframework/spring-core@5.3.14")
            .expect("valid purl");
        assert_eq!(purl.ty(), "maven");
        assert_eq!(purl.namespace(), "org.springframework");
        assert_eq!(purl.name(), "spring-core");
        assert_eq!(purl.version(), "5.3.14");

        let pkg = purl.to_package();
        assert_eq!(pkg.name, "org.springframework:spring-core");
        assert_eq!(pkg.pkg_type, Some(PkgType::Maven));
        assert_eq!(purl.lang_type(), Some(LangType::Jar));
        assert_eq!(purl.class(), ResultClass::LangPkgs);
    }

    #[test]
    fn test_parse_invalid_text_is_error() {
        assert!(PackageUrl::parse("not-a-purl").is_err());
        assert!(PackageUrl::parse("pkg:npm/").is_err());
    }

    #[test]
    fn test_decode_rpm_with_qualifiers() {
        let purl = PackageUrl::parse(
            "pkg:rpm/redhat/acl@2.2.53-1.el8?arch=aarch64&distro=redhat-8&epoch=1",
        )
        .expect("valid purl");
        let pkg = purl.to_package();
        assert_eq!(pkg.name, "acl");
        assert_eq!(pkg.version, "2.2.53");
        assert_eq!(pkg.release, "1.el8");
        assert_eq!(pkg.epoch, 1);
        assert_eq!(pkg.arch, "aarch64");
        assert_eq!(purl.class(), ResultClass::OsPkgs);
    }

    #[test]
    fn test_decode_ignores_bad_epoch() {
        let purl = PackageUrl::parse("pkg:deb/debian/bash@5.1?epoch=abc").expect("valid purl");
        let pkg = purl.to_package();
        assert_eq!(pkg.epoch, 0);
        assert_eq!(pkg.name, "bash", "OS packages keep the bare name");
    }

    #[test]
    fn test_decode_cocoapods_subpath() {
        let purl =
            PackageUrl::parse("pkg:cocoapods/GoogleUtilities@7.5.2#NSData+zlib").expect("valid");
        assert_eq!(purl.to_package().name, "GoogleUtilities/NSData+zlib");
    }

    #[test]
    fn test_k8s_lang_types() {
        let eks = PackageUrl::parse("pkg:k8s/eks/k8s.io%2Fkube-proxy@1.26.2-eksbuild.1")
            .expect("valid");
        assert_eq!(eks.lang_type(), Some(LangType::Eks));

        let upstream = PackageUrl::parse("pkg:k8s/k8s.io%2Fapiserver@1.24.1").expect("valid");
        assert_eq!(upstream.lang_type(), Some(LangType::K8sUpstream));

        let other = PackageUrl::parse("pkg:k8s/acme/k8s.io%2Fapiserver@1.24.1").expect("valid");
        assert_eq!(other.lang_type(), None);
        assert_eq!(other.class(), ResultClass::Unknown);
    }

    #[test]
    fn test_slash_in_name_is_escaped() {
        let purl = PackageUrl::encode(
            PkgType::K8s,
            &Metadata::default(),
            &Package::new("k8s.io/apiserver", "1.24.1"),
        )
        .expect("ok")
        .expect("some");
        assert_eq!(purl.as_str(), "pkg:k8s/k8s.io%2Fapiserver@1.24.1");

        let reparsed = PackageUrl::parse(purl.as_str()).expect("valid");
        assert_eq!(reparsed, purl);
        assert_eq!(reparsed.namespace(), "");
        assert_eq!(reparsed.name(), "k8s.io/apiserver");
        assert_eq!(reparsed.lang_type(), Some(LangType::K8sUpstream));
    }

    #[test]
    fn test_escaped_name_is_re_emitted_escaped() {
        let text = "pkg:k8s/eks/k8s.io%2Fkube-proxy@1.26.2-eksbuild.1";
        let purl = PackageUrl::parse(text).expect("valid");
        assert_eq!(purl.namespace(), "eks");
        assert_eq!(purl.name(), "k8s.io/kube-proxy");
        assert_eq!(purl.to_string(), text);

        let with_path = purl.clone().with_file_path("manifests/kube-proxy.yaml");
        let reparsed = PackageUrl::parse(&with_path.bom_ref()).expect("bom-ref is a valid purl");
        assert_eq!(reparsed, purl);
        assert_eq!(reparsed.class(), ResultClass::LangPkgs);
    }

    #[test]
    fn test_encode_application_uses_k8s_provider() {
        let pkg = Package::new("k8s.io/kube-proxy", "1.26.2-eksbuild.1");
        let meta = Metadata::default();
        let purl = PackageUrl::encode_application(&LangType::Gke, PkgType::K8s, &meta, &pkg)
            .expect("ok")
            .expect("some");
        assert_eq!(purl.namespace(), "gke");
        assert_eq!(purl.lang_type(), Some(LangType::Gke));

        let npm = PackageUrl::encode_application(
            &LangType::Npm,
            PkgType::Npm,
            &meta,
            &Package::new("@babel/core", "7.23.0"),
        )
        .expect("ok")
        .expect("some");
        assert_eq!(npm.namespace(), "@babel");
    }

    #[test]
    fn test_unsupported_type_decodes_without_ecosystem() {
        let purl = PackageUrl::parse("pkg:hackage/aeson@2.0.0").expect("valid");
        assert_eq!(purl.pkg_type(), None);
        assert_eq!(purl.class(), ResultClass::Unknown);
        assert_eq!(purl.to_package().pkg_type, None);
    }

    #[test]
    fn test_bom_ref_round_trip_keeps_file_path_out_of_qualifiers() {
        let purl = PackageUrl::parse("pkg:npm/lodash@4.17.21")
            .expect("valid")
            .with_file_path("app/node_modules/lodash/package.json");
        let bom_ref = purl.bom_ref();
        assert!(bom_ref.contains("file_path="), "{bom_ref}");
        assert!(!purl.as_str().contains("file_path"));

        let reparsed = PackageUrl::parse(&bom_ref).expect("bom-ref is a valid purl");
        assert_eq!(reparsed, purl);
        assert_eq!(reparsed.file_path(), "app/node_modules/lodash/package.json");
        assert!(reparsed.qualifiers().get(FILE_PATH_QUALIFIER).is_none());
    }

    #[test]
    fn test_bom_ref_without_file_path_is_canonical() {
        let purl = PackageUrl::parse("pkg:cargo/abomination@0.7.3").expect("valid");
        assert_eq!(purl.bom_ref(), purl.to_string());
    }

    #[test]
    fn test_identifier_keeps_original_text() {
        let text = "pkg:golang/github.com/go-sql-driver/mysql@v1.5.0";
        let pkg = PackageUrl::parse(text).expect("valid").to_package();
        assert_eq!(pkg.identifier.as_deref(), Some(text));
        assert_eq!(pkg.name, "github.com/go-sql-driver/mysql");
    }

    #[test]
    fn test_qualifiers_push_replaces_and_keeps_order() {
        let mut q = Qualifiers::new();
        q.push("arch", "x86_64");
        q.push("distro", "redhat-8");
        q.push("arch", "aarch64");
        let keys: Vec<_> = q.keys().collect();
        assert_eq!(keys, vec!["arch", "distro"]);
        assert_eq!(q.get("arch"), Some("aarch64"));

        let reordered: Qualifiers = [("distro", "redhat-8"), ("arch", "aarch64")]
            .into_iter()
            .collect();
        assert_eq!(q, reordered);
    }
}
