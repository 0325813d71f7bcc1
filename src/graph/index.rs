//! Arena index over the package elements of one document.

use crate::parsers::{element_ref, SpdxDocument, SpdxFile, SpdxPackage};
use std::collections::HashMap;

/// Element identifier prefix of an operating-system element.
pub const ELEMENT_OPERATING_SYSTEM: &str = "OperatingSystem";
/// Element identifier prefix of an application element.
pub const ELEMENT_APPLICATION: &str = "Application";
/// Element identifier prefix of a file element.
pub const ELEMENT_FILE: &str = "File";

/// Role of an element, inferred from its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    OperatingSystem,
    Application,
    File,
    Package,
}

impl ElementKind {
    #[must_use]
    pub fn of(spdx_id: &str) -> Self {
        let id = element_ref(spdx_id);
        if id.starts_with(ELEMENT_OPERATING_SYSTEM) {
            Self::OperatingSystem
        } else if id.starts_with(ELEMENT_APPLICATION) {
            Self::Application
        } else if id.starts_with(ELEMENT_FILE) {
            Self::File
        } else {
            Self::Package
        }
    }
}

/// Package elements in document order, addressed by stable slot numbers.
///
/// Identifiers are compared without the `SPDXRef-` prefix. When an
/// identifier is declared twice the later element wins and the earlier
/// slot becomes unreachable.
#[derive(Debug)]
pub struct ElementIndex<'a> {
    packages: Vec<&'a SpdxPackage>,
    by_ref: HashMap<&'a str, usize>,
}

impl<'a> ElementIndex<'a> {
    #[must_use]
    pub fn build(document: &'a SpdxDocument) -> Self {
        let packages: Vec<&SpdxPackage> = document.packages.iter().collect();
        let by_ref = packages
            .iter()
            .enumerate()
            .map(|(slot, pkg)| (element_ref(&pkg.spdx_id), slot))
            .collect();
        Self { packages, by_ref }
    }

    /// Slot of the element with this identifier.
    #[must_use]
    pub fn slot(&self, spdx_id: &str) -> Option<usize> {
        self.by_ref.get(element_ref(spdx_id)).copied()
    }

    /// Element stored in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was not produced by this index.
    #[must_use]
    pub fn get(&self, slot: usize) -> &'a SpdxPackage {
        self.packages[slot]
    }

    /// Reachable slots in document order.
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.packages.len())
            .filter(|slot| self.by_ref.get(element_ref(&self.packages[*slot].spdx_id)) == Some(slot))
    }
}

/// Package-to-file paths from containment relationships.
///
/// Only `CONTAINS` (or `CONTAIN`) relationships whose target is a known file
/// element contribute; the last matching relationship for a package wins.
#[must_use]
pub fn package_file_paths(document: &SpdxDocument) -> HashMap<&str, &str> {
    let files: HashMap<&str, &SpdxFile> = document
        .files
        .iter()
        .map(|f| (element_ref(&f.spdx_id), f))
        .collect();

    let mut paths = HashMap::new();
    for rel in &document.relationships {
        if !matches!(rel.relationship_type.as_str(), "CONTAINS" | "CONTAIN") {
            continue;
        }
        if ElementKind::of(&rel.related_element) != ElementKind::File {
            continue;
        }
        if let Some(file) = files.get(element_ref(&rel.related_element)) {
            paths.insert(element_ref(&rel.element), file.file_name.as_str());
        }
    }
    paths
}
