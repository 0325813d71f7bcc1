//! Shared utilities.

mod version;

pub use version::{format_version, RpmVersion};
