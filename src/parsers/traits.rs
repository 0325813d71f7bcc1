//! Reader trait and error types for SBOM document decoders.

use super::spdx::SpdxDocument;
use std::path::Path;
use thiserror::Error;

/// Errors raised while decoding a document envelope.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("Invalid SBOM structure: {0}")]
    InvalidStructure(String),

    #[error("Unknown SBOM format: {0}")]
    UnknownFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

/// Confidence that a reader understands some content, in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FormatConfidence(f32);

impl FormatConfidence {
    pub const NONE: Self = Self(0.0);
    pub const LOW: Self = Self(0.25);
    pub const HIGH: Self = Self(0.75);
    pub const CERTAIN: Self = Self(1.0);

    #[must_use]
    pub const fn value(&self) -> f32 {
        self.0
    }

    #[must_use]
    pub fn can_parse(&self) -> bool {
        self.0 >= Self::LOW.0
    }
}

impl Default for FormatConfidence {
    fn default() -> Self {
        Self::NONE
    }
}

/// Serialization variant of an SPDX document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentVariant {
    Json,
    TagValue,
}

/// Detection result from a reader.
#[derive(Debug, Clone)]
pub struct FormatDetection {
    pub confidence: FormatConfidence,
    pub variant: Option<DocumentVariant>,
    pub version: Option<String>,
}

impl FormatDetection {
    #[must_use]
    pub const fn no_match() -> Self {
        Self {
            confidence: FormatConfidence::NONE,
            variant: None,
            version: None,
        }
    }

    #[must_use]
    pub const fn with_confidence(confidence: FormatConfidence, variant: DocumentVariant) -> Self {
        Self {
            confidence,
            variant: Some(variant),
            version: None,
        }
    }

    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }
}

/// Decoder from serialized SBOM text to the document object model.
pub trait SbomParser {
    /// Parse a document from a file path
    fn parse(&self, path: &Path) -> Result<SpdxDocument, ParseError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Parse a document from string content
    fn parse_str(&self, content: &str) -> Result<SpdxDocument, ParseError>;

    fn format_name(&self) -> &str;

    /// Lightweight structural sniffing without a full parse.
    fn detect(&self, content: &str) -> FormatDetection;

    fn can_parse(&self, content: &str) -> bool {
        self.detect(content).confidence.can_parse()
    }
}
