//! **Core of a software composition analysis scanner.**
//!
//! `sca-core` turns what a scanner found in an artifact into something that
//! can be matched against vulnerability advisories:
//!
//! - **Package identity**: every package record is encoded into a canonical
//!   Package URL following the rules of its ecosystem, and any such
//!   identifier can be decoded back into a package record.
//! - **SBOM ingestion**: an SPDX document (JSON or tag-value) is rebuilt
//!   into the OS / application / package tree the scanner itself would have
//!   produced.
//! - **Vulnerability matching**: one driver per ecosystem queries an
//!   [`AdvisorySource`] and keeps the advisories whose version ranges cover
//!   the installed version.
//!
//! ## Modules
//!
//! - **[`model`]**: [`Package`], [`Application`], [`Sbom`] and the ecosystem enums.
//! - **[`purl`]**: [`PackageUrl`] encode and decode.
//! - **[`parsers`]**: the SPDX document object model and its decoders.
//! - **[`graph`]**: [`SbomGraphBuilder`], which reconstructs the package tree.
//! - **[`detector`]**: [`Driver`], [`AdvisorySource`] and the per-ecosystem
//!   version comparers.
//! - **[`pipeline`]**: [`scan_sbom`], the whole workflow in one call.
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use sca_core::config::DetectionConfig;
//! use sca_core::{parse_sbom, scan_sbom, MemoryAdvisoryStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sbom = parse_sbom(Path::new("image.spdx.json"))?;
//!     let store = MemoryAdvisoryStore::load(Path::new("advisories.json"))?;
//!
//!     let report = scan_sbom(&sbom, Arc::new(store), &DetectionConfig::default())?;
//!     for vuln in report.vulnerabilities() {
//!         println!("{} {} {}", vuln.vulnerability_id, vuln.pkg_name, vuln.installed_version);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Encoding an identifier
//!
//! ```
//! use sca_core::model::{Metadata, Os, OsFamily, Package, PkgType};
//! use sca_core::PackageUrl;
//!
//! let metadata = Metadata::with_os(Os::new(OsFamily::Debian, "12.1"));
//! let pkg = Package::new("bash", "5.2.15");
//! let purl = PackageUrl::encode(PkgType::Deb, &metadata, &pkg)
//!     .unwrap()
//!     .expect("deb packages always have an identity");
//! assert_eq!(purl.name(), "bash");
//! assert_eq!(purl.qualifiers().get("distro"), Some("debian-12.1"));
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    // Variable names like `lower`/`upper` are clear in context
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod graph;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod purl;
pub mod utils;

pub use config::{ConfigError, ScaConfig, Validatable};
pub use detector::{AdvisorySource, Comparer, Driver, Ecosystem, MemoryAdvisoryStore};
pub use error::{ErrorContext, Result, ScaError};
pub use graph::SbomGraphBuilder;
pub use model::{Application, LangType, OsFamily, Package, PkgType, Sbom};
pub use parsers::{parse_sbom, parse_sbom_str, SbomParser, SpdxDocument, SpdxParser};
pub use pipeline::{scan_sbom, ScanReport};
pub use purl::PackageUrl;
