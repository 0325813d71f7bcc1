//! SBOM graph ingestion.
//!
//! An SPDX document is a flat list of elements joined by typed
//! relationships. [`SbomGraphBuilder`] turns it back into the
//! OS / application / package hierarchy:
//!
//! ```text
//! root (container image, filesystem, ...)
//! ├── OperatingSystem (debian 12)
//! │   ├── OS package A
//! │   └── OS package B
//! └── Application (package-lock.json)
//!     ├── npm package A
//!     └── npm package B
//! ```
//!
//! Elements are stored in an arena ([`ElementIndex`]) and relationships refer
//! to them by slot, so dangling or duplicate endpoints are skipped rather
//! than dereferenced.

mod builder;
mod index;

pub use builder::{
    SbomGraphBuilder, PROPERTY_LAYER_DIFF_ID, PROPERTY_LAYER_DIGEST, PROPERTY_PKG_ID,
    SOURCE_PACKAGE_PREFIX,
};
pub use index::{
    package_file_paths, ElementIndex, ElementKind, ELEMENT_APPLICATION, ELEMENT_FILE,
    ELEMENT_OPERATING_SYSTEM,
};
