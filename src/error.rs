//! Unified error types for sca-core.
//!
//! Only hard failures live here. Package-scoped outcomes such as an
//! unsupported ecosystem or a non-resolvable identity are expressed as
//! `Option::None` by the producing API and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sca-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScaError {
    /// Malformed identifiers, digests or SBOM documents
    #[error("Failed to parse: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Failures reported by, or while loading, an advisory source
    #[error("Advisory lookup failed: {context}")]
    Advisory {
        context: String,
        #[source]
        source: AdvisoryErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Malformed PURL: {purl} - {reason}")]
    InvalidPurl { purl: String, reason: String },

    #[error("Malformed digest reference: {digest} - {reason}")]
    InvalidDigest { digest: String, reason: String },

    #[error("Invalid source info: {0}")]
    InvalidSourceInfo(String),

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

/// Specific advisory error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AdvisoryErrorKind {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Failed to load advisory database: {0}")]
    Load(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sca-core operations
pub type Result<T> = std::result::Result<T, ScaError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ScaError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for a malformed package URL
    pub fn invalid_purl(purl: impl Into<String>, reason: impl Into<String>) -> Self {
        let purl = purl.into();
        Self::parse(
            format!("purl({purl})"),
            ParseErrorKind::InvalidPurl {
                purl,
                reason: reason.into(),
            },
        )
    }

    /// Create a parse error for a malformed digest reference
    pub fn invalid_digest(digest: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::parse(
            "failed to parse digest",
            ParseErrorKind::InvalidDigest {
                digest: digest.into(),
                reason: reason.into(),
            },
        )
    }

    /// Create an advisory error with context
    pub fn advisory(context: impl Into<String>, source: AdvisoryErrorKind) -> Self {
        Self::Advisory {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ScaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ScaError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<crate::parsers::ParseError> for ScaError {
    fn from(err: crate::parsers::ParseError) -> Self {
        Self::parse(
            "SBOM document",
            ParseErrorKind::InvalidStructure(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// ```ignore
/// use sca_core::error::ErrorContext;
///
/// let advisories = source
///     .get_advisories(&prefix, &name)
///     .with_context(|| format!("failed to get {ecosystem} advisories"))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    ///
    /// The context string is prepended to the error's existing context.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ScaError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

fn add_context_to_error(err: ScaError, new_ctx: &str) -> ScaError {
    match err {
        ScaError::Parse {
            context: existing,
            source,
        } => ScaError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ScaError::Advisory {
            context: existing,
            source,
        } => ScaError::Advisory {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ScaError::Io {
            path,
            message,
            source,
        } => ScaError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ScaError::Config(msg) => ScaError::Config(chain_context(new_ctx, &msg)),
        ScaError::Validation(msg) => ScaError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Returns "`new`: `existing`", or just `new` when nothing exists yet.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
