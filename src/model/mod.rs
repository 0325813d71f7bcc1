//! Data model shared by the identity codec, SBOM ingestion and matching.
//!
//! Analyzer output and imported SBOM documents both end up as [`Package`]
//! records arranged in a [`Sbom`] tree: OS packages grouped by the file
//! they were found in, and language libraries grouped into [`Application`]s.

mod ecosystem;
mod package;
mod vulnerability;

pub use ecosystem::{LangType, OsFamily, PkgType};
pub use package::{
    Application, ImageConfig, Layer, Metadata, Os, Package, PackageInfo, Sbom,
};
pub use vulnerability::{Advisory, DataSource, DetectedVulnerability};
