//! Permissive semver-shaped versions shared by most language ecosystems.

use super::constraint::{satisfies, Operator, Versioned};
use super::{Comparer, ConstraintError};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(\d+(?:\.\d+)*)(?:-?([0-9A-Za-z~-]+(?:\.[0-9A-Za-z~-]+)*))?(?:\+([0-9A-Za-z~-]+(?:\.[0-9A-Za-z~-]+)*))?$",
    )
    .expect("static regex")
});

/// `v?N(.N)*[-pre][+build]`, with any number of numeric segments.
///
/// Missing segments compare as zero, a pre-release sorts before its
/// release and build metadata is ignored.
#[derive(Debug, Clone)]
pub struct GenericVersion {
    segments: Vec<u64>,
    pre: Option<String>,
}

impl GenericVersion {
    #[must_use]
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    #[must_use]
    pub fn pre(&self) -> Option<&str> {
        self.pre.as_deref()
    }

    fn segment(&self, i: usize) -> u64 {
        self.segments.get(i).copied().unwrap_or(0)
    }
}

fn cmp_pre(a: &str, b: &str) -> Ordering {
    match (semver::Prerelease::new(a), semver::Prerelease::new(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

impl Ord for GenericVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => cmp_pre(a, b),
            })
    }
}

impl PartialOrd for GenericVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GenericVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for GenericVersion {}

impl Versioned for GenericVersion {
    const SCHEME: &'static str = "generic";

    fn parse(s: &str) -> Result<Self, ConstraintError> {
        let caps = VERSION
            .captures(s.trim())
            .ok_or_else(|| ConstraintError::InvalidVersion(s.to_string()))?;
        let segments = caps[1]
            .split('.')
            .map(|seg| seg.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConstraintError::InvalidVersion(s.to_string()))?;
        Ok(Self {
            segments,
            pre: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }

    fn upper_bound(&self, op: Operator) -> Option<Self> {
        let n = self.segments.len();
        let idx = match op {
            Operator::Pessimistic => n.saturating_sub(2),
            Operator::Tilde => usize::from(n > 1),
            Operator::Caret => self
                .segments
                .iter()
                .position(|&s| s != 0)
                .unwrap_or(n - 1),
            _ => return None,
        };
        let mut segments = self.segments[..idx].to_vec();
        segments.push(self.segment(idx).saturating_add(1));
        Some(Self {
            segments,
            pre: None,
        })
    }
}

/// Comparer for Cargo, Composer, Go, NuGet, Pub, Hex, Conan, Swift,
/// Bitnami and Kubernetes components.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericComparer;

impl Comparer for GenericComparer {
    fn matches(&self, version: &str, constraint: &str) -> Result<bool, ConstraintError> {
        let version = GenericVersion::parse(version)?;
        satisfies(&version, constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> GenericVersion {
        GenericVersion::parse(s).expect("valid version")
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.2.3") < v("1.2.10"));
        assert!(v("1.2") == v("1.2.0"));
        assert!(v("v1.0.0") == v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
        assert!(v("1.0.0+build.5") == v("1.0.0"));
        assert!(v("1.2.3.4") > v("1.2.3"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(GenericVersion::parse("latest").is_err());
        assert!(GenericVersion::parse("").is_err());
    }

    #[test]
    fn test_range_operators() {
        let c = GenericComparer;
        assert!(c.matches("1.2.9", "~> 1.2.3").expect("ok"));
        assert!(!c.matches("1.3.0", "~> 1.2.3").expect("ok"));
        assert!(c.matches("1.9", "~> 1.2").expect("ok"));
        assert!(!c.matches("2.0", "~> 1.2").expect("ok"));

        assert!(c.matches("1.9.0", "^1.2.3").expect("ok"));
        assert!(!c.matches("2.0.0", "^1.2.3").expect("ok"));
        assert!(!c.matches("0.3.0", "^0.2.3").expect("ok"));
        assert!(!c.matches("0.0.4", "^0.0.3").expect("ok"));

        assert!(c.matches("1.2.9", "~1.2.3").expect("ok"));
        assert!(!c.matches("1.3.0", "~1.2.3").expect("ok"));
        assert!(c.matches("1.9.0", "~1").expect("ok"));
    }

    #[test]
    fn test_or_and_groups() {
        let c = GenericComparer;
        let range = ">=1.0.0, <1.4.2 || >=2.0.0, <2.1.1";
        assert!(c.matches("1.4.1", range).expect("ok"));
        assert!(!c.matches("1.4.2", range).expect("ok"));
        assert!(c.matches("2.1.0", range).expect("ok"));
        assert!(!c.matches("3.0.0", range).expect("ok"));
    }

    #[test]
    fn test_go_pseudo_versions() {
        let c = GenericComparer;
        assert!(c
            .matches("v0.0.0-20220101000000-abcdef123456", "<0.1.0")
            .expect("ok"));
    }
}
