//! Package tree reconstruction from the relationships of one SPDX document.

use super::index::{package_file_paths, ElementIndex, ElementKind};
use crate::error::{ErrorContext, ParseErrorKind, Result, ScaError};
use crate::model::{Application, LangType, Os, Package, PackageInfo, PkgType, Sbom};
use crate::parsers::{SpdxDocument, SpdxPackage};
use crate::purl::PackageUrl;
use crate::utils::RpmVersion;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use tracing::debug;

/// Prefix of a source-info field naming the source package.
pub const SOURCE_PACKAGE_PREFIX: &str = "built package from";

pub const PROPERTY_PKG_ID: &str = "PkgID";
pub const PROPERTY_LAYER_DIGEST: &str = "LayerDigest";
pub const PROPERTY_LAYER_DIFF_ID: &str = "LayerDiffID";

const REF_TYPE_PURL: &str = "purl";

/// Builds an [`Sbom`] from a decoded document.
///
/// Relationships drive the primary classification: OS elements own OS
/// packages, application elements own libraries. Packages that no
/// relationship claims are classified afterwards by their identifier type.
pub struct SbomGraphBuilder<'a> {
    document: &'a SpdxDocument,
    index: ElementIndex<'a>,
    file_paths: HashMap<&'a str, &'a str>,
}

impl<'a> SbomGraphBuilder<'a> {
    #[must_use]
    pub fn new(document: &'a SpdxDocument) -> Self {
        Self {
            document,
            index: ElementIndex::build(document),
            file_paths: package_file_paths(document),
        }
    }

    /// Reconstruct the package tree.
    ///
    /// Fails if an embedded identifier or a source-info field is malformed.
    /// Packages without an identifier, or with an unsupported type, are left
    /// out.
    pub fn build(self) -> Result<Sbom> {
        let mut sbom = Sbom::default();
        let mut os_pkgs = Vec::new();
        let mut apps: IndexMap<usize, Application> = IndexMap::new();
        let mut orphans: IndexSet<usize> = self.index.slots().collect();

        let relationships = self
            .document
            .relationships
            .iter()
            .filter(|rel| !matches!(rel.relationship_type.as_str(), "DESCRIBES" | "DESCRIBE"));

        for rel in relationships {
            let (Some(slot_a), Some(slot_b)) = (
                self.index.slot(&rel.element),
                self.index.slot(&rel.related_element),
            ) else {
                debug!(
                    element = %rel.element,
                    related = %rel.related_element,
                    "Skipping relationship with a missing package"
                );
                continue;
            };
            let pkg_a = self.index.get(slot_a);
            let pkg_b = self.index.get(slot_b);

            match (ElementKind::of(&pkg_a.spdx_id), ElementKind::of(&pkg_b.spdx_id)) {
                (_, ElementKind::OperatingSystem) => {
                    sbom.os = Some(parse_os(pkg_b));
                    orphans.shift_remove(&slot_b);
                }
                (ElementKind::OperatingSystem, _) => {
                    let Some(pkg) = parse_package(pkg_b, Some(&self.file_paths))
                        .context("failed to parse os package")?
                    else {
                        continue;
                    };
                    os_pkgs.push(pkg);
                    orphans.shift_remove(&slot_b);
                }
                (_, ElementKind::Application) => {}
                (ElementKind::Application, _) => {
                    let app = apps
                        .entry(slot_a)
                        .or_insert_with(|| init_application(pkg_a));
                    let Some(pkg) = parse_package(pkg_b, Some(&self.file_paths))
                        .context("failed to parse language-specific package")?
                    else {
                        continue;
                    };
                    app.packages.push(pkg);
                    orphans.shift_remove(&slot_a);
                    orphans.shift_remove(&slot_b);
                }
                _ => {}
            }
        }

        if !os_pkgs.is_empty() {
            sbom.packages.push(PackageInfo {
                file_path: String::new(),
                packages: os_pkgs,
            });
        }
        sbom.applications.extend(apps.into_values());

        self.add_orphans(&mut sbom, orphans)?;
        Ok(sbom)
    }

    /// Classify unclaimed packages by their identifier type.
    ///
    /// OS packages join the OS group; language packages are grouped per type
    /// into applications sourced from the SBOM itself.
    fn add_orphans(&self, sbom: &mut Sbom, orphans: IndexSet<usize>) -> Result<()> {
        let mut os_pkgs = Vec::new();
        let mut apps: IndexMap<PkgType, Application> = IndexMap::new();

        for slot in orphans {
            let Some(pkg) = parse_package(self.index.get(slot), None)
                .context("failed to parse package")?
            else {
                continue;
            };
            let Some(pkg_type) = pkg.pkg_type else {
                continue;
            };

            if pkg_type.os_pkg() {
                os_pkgs.push(pkg);
            } else {
                apps.entry(pkg_type)
                    .or_insert_with(|| Application {
                        src_type: LangType::Sbom,
                        pkg_type: Some(pkg_type),
                        file_path: String::new(),
                        packages: Vec::new(),
                    })
                    .packages
                    .push(pkg);
            }
        }

        if !os_pkgs.is_empty() {
            match sbom.packages.first_mut() {
                Some(info) => info.packages.extend(os_pkgs),
                None => sbom.packages.push(PackageInfo {
                    file_path: String::new(),
                    packages: os_pkgs,
                }),
            }
        }
        for mut app in apps.into_values() {
            app.packages.sort_by(Package::cmp_identity);
            sbom.applications.push(app);
        }
        Ok(())
    }
}

fn parse_os(element: &SpdxPackage) -> Os {
    Os::new(element.name.as_str(), element.version.clone())
}

fn init_application(element: &SpdxPackage) -> Application {
    let mut app = Application::new(LangType::from(element.name.as_str()));
    if app.src_type.is_file_scoped() {
        app.file_path.clone_from(&element.source_info);
    }
    app
}

/// Decode one package element.
///
/// `Ok(None)` when the element carries no package-manager identifier or its
/// type is unsupported.
fn parse_package(
    element: &SpdxPackage,
    file_paths: Option<&HashMap<&str, &str>>,
) -> Result<Option<Package>> {
    let Some(locator) = purl_locator(element) else {
        debug!(element = %element.spdx_id, "Skipping package without a package-manager reference");
        return Ok(None);
    };
    let purl = PackageUrl::parse(locator).context("failed to parse purl from string")?;
    let Some(pkg_type) = purl.pkg_type() else {
        debug!(element = %element.spdx_id, ty = purl.ty(), "Skipping unsupported package type");
        return Ok(None);
    };

    let mut pkg = purl.to_package();

    if element.license_declared != "NONE" && !element.license_declared.is_empty() {
        pkg.licenses = element
            .license_declared
            .split(',')
            .map(str::to_string)
            .collect();
    }

    if element.source_info.starts_with(SOURCE_PACKAGE_PREFIX) {
        let source = parse_source_info(pkg_type, &element.source_info)?;
        pkg.src_epoch = source.epoch;
        pkg.src_name = source.name;
        pkg.src_version = source.version;
        pkg.src_release = source.release;
    }

    let id = crate::parsers::element_ref(&element.spdx_id);
    if let Some(path) = file_paths.and_then(|paths| paths.get(id)) {
        pkg.file_path = (*path).to_string();
    } else if let Some(file) = element.files.first() {
        pkg.file_path.clone_from(&file.file_name);
    }

    let texts = &element.attribution_texts;
    pkg.id = lookup_attribution_text(texts, PROPERTY_PKG_ID);
    pkg.layer.digest = lookup_attribution_text(texts, PROPERTY_LAYER_DIGEST);
    pkg.layer.diff_id = lookup_attribution_text(texts, PROPERTY_LAYER_DIFF_ID);

    Ok(Some(pkg))
}

fn purl_locator(element: &SpdxPackage) -> Option<&str> {
    element
        .external_refs
        .iter()
        .find(|r| {
            r.ref_type == REF_TYPE_PURL
                && matches!(r.category.as_str(), "PACKAGE-MANAGER" | "PACKAGE_MANAGER")
        })
        .map(|r| r.locator.as_str())
}

fn lookup_attribution_text(texts: &[String], key: &str) -> String {
    let prefix = format!("{key}: ");
    texts
        .iter()
        .find(|text| text.starts_with(key))
        .map(|text| text.strip_prefix(&prefix).unwrap_or(text).to_string())
        .unwrap_or_default()
}

#[derive(Debug, Default, PartialEq, Eq)]
struct SourcePackage {
    epoch: u32,
    name: String,
    version: String,
    release: String,
}

/// Parse `built package from: <name> <version>`.
fn parse_source_info(pkg_type: PkgType, source_info: &str) -> Result<SourcePackage> {
    let prefix = format!("{SOURCE_PACKAGE_PREFIX}: ");
    let name_version = source_info.strip_prefix(&prefix).unwrap_or(source_info);
    let fields: Vec<&str> = name_version.split(' ').collect();
    let [name, version] = fields.as_slice() else {
        return Err(ScaError::parse(
            "failed to parse source info",
            ParseErrorKind::InvalidSourceInfo(source_info.to_string()),
        ));
    };

    let mut source = SourcePackage {
        name: (*name).to_string(),
        ..SourcePackage::default()
    };
    if pkg_type == PkgType::Rpm {
        let rpm = RpmVersion::parse(version);
        source.epoch = rpm.epoch;
        source.version = rpm.version;
        source.release = rpm.release;
    } else {
        source.version = (*version).to_string();
    }
    Ok(source)
}
