//! CLI command handlers.
//!
//! Testable handlers invoked by main.rs, one per subcommand.

mod identity;
mod scan;

pub use identity::{decode_identity, encode_package, run_decode, run_purl, DecodedIdentity, EncodeArgs};
pub use scan::{run_sbom, run_scan, scan_file};
