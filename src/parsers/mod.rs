//! SBOM document decoders.
//!
//! SPDX JSON and SPDX tag-value documents are decoded into the
//! [`SpdxDocument`] object model, which [`crate::graph`] then turns into a
//! package tree.
//!
//! ## Usage
//!
//! ```no_run
//! use sca_core::parsers::{parse_sbom, detect_format};
//! use std::path::Path;
//!
//! let sbom = parse_sbom(Path::new("sbom.spdx.json")).unwrap();
//!
//! let content = std::fs::read_to_string("sbom.spdx").unwrap();
//! if let Some(detection) = detect_format(&content) {
//!     println!("Detected: {} ({:?})", detection.format_name, detection.variant);
//! }
//! ```

mod spdx;
mod traits;

pub use spdx::{
    element_ref, SpdxDocument, SpdxExternalRef, SpdxFile, SpdxPackage, SpdxParser,
    SpdxRelationship, SPDX_REF_PREFIX,
};
pub use traits::{DocumentVariant, FormatConfidence, FormatDetection, ParseError, SbomParser};

use crate::error::{Result, ScaError};
use crate::graph::SbomGraphBuilder;
use crate::model::Sbom;
use std::path::Path;

/// Result of format detection
#[derive(Debug, Clone)]
pub struct DetectedFormat {
    pub format_name: String,
    pub confidence: f32,
    pub variant: Option<DocumentVariant>,
    pub version: Option<String>,
}

/// Detect the document format without parsing.
///
/// Returns None if the content is not a recognised SPDX document.
pub fn detect_format(content: &str) -> Option<DetectedFormat> {
    let parser = SpdxParser::new();
    let detection = parser.detect(content);
    if !detection.confidence.can_parse() {
        return None;
    }
    Some(DetectedFormat {
        format_name: parser.format_name().to_string(),
        confidence: detection.confidence.value(),
        variant: detection.variant,
        version: detection.version,
    })
}

/// Maximum SBOM file size (512 MB).
const MAX_SBOM_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// Read, decode and reconstruct the package tree of an SBOM file.
pub fn parse_sbom(path: &Path) -> Result<Sbom> {
    let metadata = std::fs::metadata(path).map_err(|e| ScaError::io(path, e))?;
    if metadata.len() > MAX_SBOM_FILE_SIZE {
        return Err(ScaError::validation(format!(
            "SBOM file is {} MB, exceeding the {} MB limit",
            metadata.len() / (1024 * 1024),
            MAX_SBOM_FILE_SIZE / (1024 * 1024),
        )));
    }
    let content = std::fs::read_to_string(path).map_err(|e| ScaError::io(path, e))?;
    parse_sbom_str(&content)
}

/// Decode SBOM text and reconstruct its package tree.
pub fn parse_sbom_str(content: &str) -> Result<Sbom> {
    let document = SpdxParser::new().parse_str(content)?;
    SbomGraphBuilder::new(&document).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_spdx_json() {
        let content = r#"{"spdxVersion": "SPDX-2.3", "SPDXID": "SPDXRef-DOCUMENT"}"#;
        let detected = detect_format(content).expect("Should detect format");
        assert_eq!(detected.format_name, "SPDX");
        assert!(detected.confidence >= 0.75);
        assert_eq!(detected.variant, Some(DocumentVariant::Json));
        assert_eq!(detected.version, Some("2.3".to_string()));
    }

    #[test]
    fn test_detect_unknown_format() {
        let content = r#"{"some": "random", "json": "content"}"#;
        assert!(detect_format(content).is_none());
    }

    #[test]
    fn test_parse_sbom_str_rejects_garbage() {
        assert!(parse_sbom_str("not an sbom").is_err());
    }
}
