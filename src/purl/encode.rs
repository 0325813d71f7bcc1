//! Per-ecosystem encoding rules.
//!
//! Every rule is a pure function of the package name and the artifact
//! metadata. The match in [`split_name`] is exhaustive over [`PkgType`], so a
//! new ecosystem cannot be added without deciding how its name decomposes.

use super::{oci, PackageUrl, Qualifiers};
use crate::error::Result;
use crate::model::{Metadata, Os, Package, PkgType};
use crate::utils::{format_version, RpmVersion};
use tracing::debug;

/// Name decomposed into PURL segments.
#[derive(Debug, Default, PartialEq, Eq)]
struct NameParts {
    namespace: String,
    name: String,
    subpath: String,
}

impl NameParts {
    fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Split on the rightmost `/`.
    fn rsplit(name: &str) -> Self {
        match name.rsplit_once('/') {
            Some((namespace, name)) => Self {
                namespace: namespace.to_string(),
                name: name.to_string(),
                subpath: String::new(),
            },
            None => Self::plain(name),
        }
    }
}

pub(super) fn encode(
    pkg_type: PkgType,
    metadata: &Metadata,
    pkg: &Package,
) -> Result<Option<PackageUrl>> {
    encode_in(pkg_type, None, metadata, pkg)
}

/// Encode with the k8s provider namespace (`eks`, `gke`, ...) if known.
pub(super) fn encode_in(
    pkg_type: PkgType,
    provider: Option<&str>,
    metadata: &Metadata,
    pkg: &Package,
) -> Result<Option<PackageUrl>> {
    if pkg_type == PkgType::Oci {
        return oci::encode(metadata);
    }

    let (mut epoch, version, release) = if pkg_type == PkgType::Rpm && pkg.release.is_empty() {
        // combined "epoch:version-release" strings from some analyzers
        let rpm = RpmVersion::parse(&pkg.version);
        let epoch = if pkg.epoch != 0 { pkg.epoch } else { rpm.epoch };
        (epoch, rpm.version, rpm.release)
    } else {
        (pkg.epoch, pkg.version.clone(), pkg.release.clone())
    };

    let mut qualifiers = Qualifiers::new();
    if metadata.os.is_some() {
        if !pkg.arch.is_empty() {
            qualifiers.push("arch", pkg.arch.as_str());
        }
        if epoch != 0 {
            qualifiers.push("epoch", epoch.to_string());
        }
        // carried by the qualifier instead of the version
        epoch = 0;
    }
    let version = format_version(epoch, &version, &release);

    let Some(parts) = split_name(pkg_type, &pkg.name) else {
        debug!(name = %pkg.name, %pkg_type, "package has no resolvable identity");
        return Ok(None);
    };
    if parts.name.is_empty() {
        debug!(%pkg_type, "package name is empty, skipping identifier");
        return Ok(None);
    }

    let namespace = match (pkg_type, metadata.os.as_ref()) {
        (PkgType::Rpm, Some(os)) => {
            rpm_qualifiers(os, &pkg.modularity_label, &mut qualifiers);
            os.family.purl_token().to_string()
        }
        (PkgType::Deb, Some(os)) => {
            qualifiers.push("distro", format!("{}-{}", os.family, os.name));
            os.family.as_str().to_string()
        }
        (PkgType::Apk, Some(os)) => {
            qualifiers.push("distro", os.name.as_str());
            os.family.as_str().to_lowercase()
        }
        (PkgType::K8s, _) => provider.unwrap_or_default().to_string(),
        _ => parts.namespace,
    };

    let purl = PackageUrl::new(
        pkg_type.as_str(),
        &namespace,
        &parts.name,
        &version,
        qualifiers,
        &parts.subpath,
    )?;
    Ok(Some(purl.with_file_path(pkg.file_path.as_str())))
}

fn rpm_qualifiers(os: &Os, modularity_label: &str, qualifiers: &mut Qualifiers) {
    // the SLES family name contains whitespace
    qualifiers.push("distro", format!("{}-{}", os.family.purl_token(), os.name));
    if !modularity_label.is_empty() {
        qualifiers.push("modularitylabel", modularity_label);
    }
}

/// Decompose a package name into namespace, name and subpath.
///
/// `None` means the name cannot identify a published package.
fn split_name(pkg_type: PkgType, name: &str) -> Option<NameParts> {
    let parts = match pkg_type {
        // group id and artifact id
        PkgType::Maven => NameParts::rsplit(&name.replace(':', "/")),
        PkgType::Golang => {
            if name.starts_with("./") || name.starts_with("../") {
                return None;
            }
            NameParts::rsplit(&name.to_lowercase())
        }
        // PyPI treats '-' and '_' alike and is case-insensitive
        PkgType::Pypi => NameParts::plain(name.to_lowercase().replace('_', "-")),
        PkgType::Composer | PkgType::Swift => NameParts::rsplit(name),
        PkgType::Npm => NameParts::rsplit(&name.to_lowercase()),
        // <module>/<submodule>
        PkgType::Cocoapods => match name.split_once('/') {
            Some((name, subpath)) => NameParts {
                namespace: String::new(),
                name: name.to_string(),
                subpath: subpath.to_string(),
            },
            None => NameParts::plain(name),
        },
        PkgType::Apk => NameParts::plain(name.to_lowercase()),
        PkgType::Deb
        | PkgType::Rpm
        | PkgType::Cargo
        | PkgType::Conan
        | PkgType::Conda
        | PkgType::Gem
        | PkgType::Hex
        | PkgType::Nuget
        | PkgType::Pub
        | PkgType::Bitnami
        | PkgType::Oci
        | PkgType::K8s => NameParts::plain(name),
    };
    Some(parts)
}
