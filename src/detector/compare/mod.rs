//! Version-range comparers.
//!
//! Every ecosystem family decides "is this installed version inside this
//! advisory's range" with its own version ordering. The shared decision
//! procedure lives in [`Comparer::is_vulnerable`]; implementations only
//! provide [`Comparer::matches`] for a single constraint expression.

mod constraint;
mod generic;
mod maven;
mod npm;
mod pep440;
mod rubygems;

pub use constraint::{and_terms, or_groups, satisfies, Comparator, Operator, Versioned};
pub use generic::{GenericComparer, GenericVersion};
pub use maven::{MavenComparer, MavenVersion};
pub use npm::NpmComparer;
pub use pep440::Pep440Comparer;
pub use rubygems::{GemVersion, RubyGemsComparer};

use crate::model::Advisory;
use thiserror::Error;
use tracing::warn;

/// Failure to interpret a version or a constraint expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),

    #[error("operator {op} is not supported by {scheme} versions")]
    UnsupportedOperator { op: String, scheme: &'static str },
}

/// Capability to decide whether an installed version is affected.
pub trait Comparer: Send + Sync {
    /// Whether `version` satisfies `constraint`.
    ///
    /// `constraint` is an OR (`||`) of AND groups as found in advisories.
    fn matches(&self, version: &str, constraint: &str) -> Result<bool, ConstraintError>;

    /// Whether `version` is affected by `advisory`.
    ///
    /// An empty range entry marks the advisory as applying to every version.
    /// Otherwise the version must fall in a vulnerable range (when any are
    /// given) and outside every patched and unaffected range. Unparseable
    /// ranges are logged and treated as "not vulnerable".
    fn is_vulnerable(&self, version: &str, advisory: &Advisory) -> bool {
        if advisory
            .vulnerable_versions
            .iter()
            .chain(&advisory.patched_versions)
            .any(String::is_empty)
        {
            return true;
        }

        let mut matched = false;
        if !advisory.vulnerable_versions.is_empty() {
            match self.matches(version, &advisory.vulnerable_versions.join(" || ")) {
                Ok(true) => matched = true,
                Ok(false) => return false,
                Err(e) => {
                    warn!(advisory = %advisory.vulnerability_id, version, "{e}");
                    return false;
                }
            }
        }

        let secure: Vec<&str> = advisory
            .patched_versions
            .iter()
            .chain(&advisory.unaffected_versions)
            .map(String::as_str)
            .collect();
        if secure.is_empty() {
            return matched;
        }

        match self.matches(version, &secure.join(" || ")) {
            Ok(secure) => !secure,
            Err(e) => {
                warn!(advisory = %advisory.vulnerability_id, version, "{e}");
                false
            }
        }
    }
}
