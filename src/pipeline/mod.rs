//! Pipeline orchestration: reconstructed SBOM → identifiers → vulnerabilities.
//!
//! Shared by the CLI handlers and library callers that want the whole
//! workflow in one call.

mod output;
mod scan;

pub use output::{to_json, write_json, write_output, OutputTarget};
pub use scan::{scan_sbom, ApplicationResult, MatchStatus, ScanReport};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success, nothing found
    pub const SUCCESS: i32 = 0;
    /// At least one vulnerability was detected
    pub const VULNERABILITIES_FOUND: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}
