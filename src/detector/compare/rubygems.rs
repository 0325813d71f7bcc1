//! RubyGems versions, also used for CocoaPods.

use super::constraint::{satisfies, Operator, Versioned};
use super::{Comparer, ConstraintError};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Num(u64),
    Str(String),
}

static ZERO: Segment = Segment::Num(0);

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Num(a), Self::Num(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::Num(_), Self::Str(_)) => Ordering::Greater,
            (Self::Str(_), Self::Num(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A `Gem::Version`.
///
/// Segments are split on `.` and on digit/letter boundaries; a `-` starts a
/// pre-release (`1.0-rc1` is `1.0.pre.rc.1`). Letter segments sort before
/// numbers, so any version with one is a pre-release of its numeric prefix.
/// Trailing zero segments are insignificant.
#[derive(Debug, Clone)]
pub struct GemVersion {
    segments: Vec<Segment>,
}

impl GemVersion {
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Str(_)))
    }

    /// The leading numeric segments.
    fn release(&self) -> Vec<u64> {
        self.segments
            .iter()
            .map_while(|s| match s {
                Segment::Num(n) => Some(*n),
                Segment::Str(_) => None,
            })
            .collect()
    }
}

impl Ord for GemVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| {
                let a = self.segments.get(i).unwrap_or(&ZERO);
                let b = other.segments.get(i).unwrap_or(&ZERO);
                a.cmp(b)
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for GemVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GemVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for GemVersion {}

impl Versioned for GemVersion {
    const SCHEME: &'static str = "rubygems";

    fn parse(s: &str) -> Result<Self, ConstraintError> {
        let trimmed = s.trim();
        let valid = trimmed.starts_with(|c: char| c.is_ascii_digit())
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid {
            return Err(ConstraintError::InvalidVersion(s.to_string()));
        }

        let normalized = trimmed.replace('-', ".pre.");
        let mut segments = Vec::new();
        for part in normalized.split('.').filter(|p| !p.is_empty()) {
            let mut rest = part;
            while !rest.is_empty() {
                let numeric = rest.starts_with(|c: char| c.is_ascii_digit());
                let end = rest
                    .find(|c: char| c.is_ascii_digit() != numeric)
                    .unwrap_or(rest.len());
                let (token, tail) = rest.split_at(end);
                segments.push(if numeric {
                    Segment::Num(
                        token
                            .parse()
                            .map_err(|_| ConstraintError::InvalidVersion(s.to_string()))?,
                    )
                } else {
                    Segment::Str(token.to_string())
                });
                rest = tail;
            }
        }
        Ok(Self { segments })
    }

    /// `~> 1.2.3` is below `1.3`; `~> 1` is below `2`.
    fn upper_bound(&self, op: Operator) -> Option<Self> {
        if op != Operator::Pessimistic {
            return None;
        }
        let mut release = self.release();
        if release.len() > 1 {
            release.pop();
        }
        let last = release.last_mut()?;
        *last = last.saturating_add(1);
        Some(Self {
            segments: release.into_iter().map(Segment::Num).collect(),
        })
    }
}

/// Comparer for RubyGems and CocoaPods.
#[derive(Debug, Clone, Copy, Default)]
pub struct RubyGemsComparer;

impl Comparer for RubyGemsComparer {
    fn matches(&self, version: &str, constraint: &str) -> Result<bool, ConstraintError> {
        let version = GemVersion::parse(version)?;
        satisfies(&version, constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> GemVersion {
        GemVersion::parse(s).expect("valid version")
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.0") == v("1.0.0"));
        assert!(v("1.0.a") < v("1.0"));
        assert!(v("1.0.0.rc1") < v("1.0.0"));
        assert!(v("1.0.0-rc1") < v("1.0.0"));
        assert!(v("1.0.0.beta") < v("1.0.0.rc"));
        assert!(v("1.10") > v("1.9"));
        assert!(v("1.0.0.rc1").is_prerelease());
    }

    #[test]
    fn test_pessimistic() {
        let c = RubyGemsComparer;
        assert!(c.matches("1.2.9", "~> 1.2.3").expect("ok"));
        assert!(!c.matches("1.3", "~> 1.2.3").expect("ok"));
        assert!(c.matches("1.9", "~> 1.2").expect("ok"));
        assert!(!c.matches("2.0", "~> 1.2").expect("ok"));
    }

    #[test]
    fn test_caret_is_not_a_gem_operator() {
        assert!(matches!(
            RubyGemsComparer.matches("1.0", "^1.0"),
            Err(ConstraintError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_rails_advisory() {
        let c = RubyGemsComparer;
        let range = ">= 6.1.0, < 6.1.7.1 || >= 7.0.0, < 7.0.4.1";
        assert!(c.matches("6.1.7", range).expect("ok"));
        assert!(!c.matches("6.1.7.1", range).expect("ok"));
        assert!(c.matches("7.0.4", range).expect("ok"));
    }
}
