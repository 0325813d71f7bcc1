//! PEP 440 specifiers for Python packages.

use super::constraint::{and_terms, or_groups};
use super::{Comparer, ConstraintError};
use pep440_rs::{Version, VersionSpecifiers};
use std::str::FromStr;

/// Comparer for PyPI packages.
///
/// Supports epochs, pre/post/dev releases, local versions, `~=`, `===` and
/// `==x.*` wildcards. A bare version is read as `==version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pep440Comparer;

impl Comparer for Pep440Comparer {
    fn matches(&self, version: &str, constraint: &str) -> Result<bool, ConstraintError> {
        let version = Version::from_str(version.trim())
            .map_err(|e| ConstraintError::InvalidVersion(format!("{version}: {e}")))?;

        let mut any = false;
        for group in or_groups(constraint) {
            let specifiers = VersionSpecifiers::from_str(&normalize_group(group))
                .map_err(|e| ConstraintError::InvalidConstraint(format!("{group}: {e}")))?;
            any |= specifiers.contains(&version);
        }
        Ok(any)
    }
}

fn normalize_group(group: &str) -> String {
    and_terms(group)
        .map(|term| {
            if term.starts_with(|c: char| c.is_ascii_digit()) {
                format!("=={term}")
            } else {
                term.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
