//! npm ranges, evaluated with node-semver.

use super::constraint::or_groups;
use super::{Comparer, ConstraintError};
use node_semver::{Range, Version};

/// Comparer for npm packages.
///
/// Advisory ranges join terms with commas, npm joins them with spaces; both
/// are accepted. x-ranges, hyphen ranges, `^` and `~` follow npm. A
/// pre-release only satisfies a comparator on the same `major.minor.patch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmComparer;

impl Comparer for NpmComparer {
    fn matches(&self, version: &str, constraint: &str) -> Result<bool, ConstraintError> {
        let version = version.trim();
        let version = Version::parse(version.strip_prefix('v').unwrap_or(version))
            .map_err(|e| ConstraintError::InvalidVersion(format!("{version}: {e}")))?;

        let mut any = false;
        for group in or_groups(constraint) {
            let range = Range::parse(group.replace(',', " "))
                .map_err(|e| ConstraintError::InvalidConstraint(format!("{group}: {e}")))?;
            any |= range.satisfies(&version);
        }
        Ok(any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_and_space_separated() {
        let c = NpmComparer;
        assert!(c.matches("4.17.20", ">=4.0.0, <4.17.21").expect("ok"));
        assert!(c.matches("4.17.20", ">=4.0.0 <4.17.21").expect("ok"));
        assert!(!c.matches("4.17.21", ">=4.0.0, <4.17.21").expect("ok"));
    }

    #[test]
    fn test_npm_range_forms() {
        let c = NpmComparer;
        assert!(c.matches("1.2.9", "~1.2.3").expect("ok"));
        assert!(c.matches("1.9.0", "^1.2.3").expect("ok"));
        assert!(!c.matches("2.0.0", "^1.2.3").expect("ok"));
        assert!(c.matches("1.5.0", "1.x").expect("ok"));
        assert!(c.matches("1.5.0", "1.0.0 - 2.0.0").expect("ok"));
        assert!(c.matches("3.0.0", "<1.0.0 || >=3.0.0").expect("ok"));
    }

    #[test]
    fn test_invalid_version() {
        assert!(NpmComparer.matches("not-a-version", "<1.0.0").is_err());
    }
}
