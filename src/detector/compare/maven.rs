//! Maven `ComparableVersion` ordering and version ranges.

use super::constraint::{or_groups, satisfies, Operator, Versioned};
use super::{Comparer, ConstraintError};
use std::cmp::Ordering;

const RELEASE_RANK: u8 = 5;
const UNKNOWN_RANK: u8 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Int(u64),
    /// Qualifier with its well-known rank; unknown qualifiers share one rank
    /// and compare lexically
    Qualifier(u8, String),
}

impl Item {
    fn qualifier(token: &str, followed_by_digit: bool) -> Self {
        let token = match token {
            "a" if followed_by_digit => "alpha",
            "b" if followed_by_digit => "beta",
            "m" if followed_by_digit => "milestone",
            "cr" => "rc",
            "ga" | "final" | "release" => "",
            other => other,
        };
        let rank = match token {
            "alpha" => 0,
            "beta" => 1,
            "milestone" => 2,
            "rc" => 3,
            "snapshot" => 4,
            "" => RELEASE_RANK,
            "sp" => 6,
            _ => UNKNOWN_RANK,
        };
        Self::Qualifier(rank, token.to_string())
    }

    fn is_null(&self) -> bool {
        match self {
            Self::Int(n) => *n == 0,
            Self::Qualifier(rank, _) => *rank == RELEASE_RANK,
        }
    }

    fn cmp_item(&self, other: Option<&Self>) -> Ordering {
        match (self, other) {
            (Self::Int(n), None) => n.cmp(&0),
            (Self::Qualifier(rank, _), None) => rank.cmp(&RELEASE_RANK),
            (Self::Int(a), Some(Self::Int(b))) => a.cmp(b),
            (Self::Int(_), Some(Self::Qualifier(..))) => Ordering::Greater,
            (Self::Qualifier(..), Some(Self::Int(_))) => Ordering::Less,
            (Self::Qualifier(ra, a), Some(Self::Qualifier(rb, b))) => {
                ra.cmp(rb).then_with(|| a.cmp(b))
            }
        }
    }
}

/// A Maven artifact version.
///
/// Items are split on `.`, `-` and digit/letter transitions. Qualifiers order
/// as `alpha < beta < milestone < rc = cr < snapshot < "" = ga = final =
/// release < sp`, unknown qualifiers last. Numbers sort after qualifiers and
/// trailing null items (`0`, `ga`, ...) are insignificant.
#[derive(Debug, Clone)]
pub struct MavenVersion {
    items: Vec<Item>,
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        (0..len)
            .map(|i| match (self.items.get(i), other.items.get(i)) {
                (Some(a), b) => a.cmp_item(b),
                (None, Some(b)) => b.cmp_item(None).reverse(),
                (None, None) => Ordering::Equal,
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for MavenVersion {}

impl Versioned for MavenVersion {
    const SCHEME: &'static str = "maven";

    fn parse(s: &str) -> Result<Self, ConstraintError> {
        let lower = s.trim().to_lowercase();
        if lower.is_empty() || lower.contains(char::is_whitespace) {
            return Err(ConstraintError::InvalidVersion(s.to_string()));
        }

        let mut items = Vec::new();
        let mut rest = lower.as_str();
        while !rest.is_empty() {
            rest = rest.trim_start_matches(['.', '-']);
            if rest.is_empty() {
                break;
            }
            let numeric = rest.starts_with(|c: char| c.is_ascii_digit());
            let end = rest
                .find(|c: char| c == '.' || c == '-' || c.is_ascii_digit() != numeric)
                .unwrap_or(rest.len());
            let (token, tail) = rest.split_at(end);
            if numeric {
                let n = token
                    .parse()
                    .map_err(|_| ConstraintError::InvalidVersion(s.to_string()))?;
                items.push(Item::Int(n));
            } else {
                let followed_by_digit = tail.starts_with(|c: char| c.is_ascii_digit());
                items.push(Item::qualifier(token, followed_by_digit));
            }
            rest = tail;
        }

        while items.last().is_some_and(Item::is_null) {
            items.pop();
        }
        Ok(Self { items })
    }

    fn upper_bound(&self, _op: Operator) -> Option<Self> {
        None
    }
}

/// Comparer for Maven artifacts.
///
/// Accepts both operator terms (`>=1.0, <2.0`) and Maven range notation
/// (`[1.0,2.0)`, `(,1.5]`, `[1.2]`, unions such as `[1,2),[3,4)`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MavenComparer;

impl Comparer for MavenComparer {
    fn matches(&self, version: &str, constraint: &str) -> Result<bool, ConstraintError> {
        let version = MavenVersion::parse(version)?;
        let mut any = false;
        for group in or_groups(constraint) {
            any |= if group.starts_with(['[', '(']) {
                range_matches(&version, group)?
            } else {
                satisfies(&version, group)?
            };
        }
        Ok(any)
    }
}

fn range_matches(version: &MavenVersion, spec: &str) -> Result<bool, ConstraintError> {
    let invalid = || ConstraintError::InvalidConstraint(spec.to_string());
    let mut any = false;
    let mut rest = spec.trim();

    while !rest.is_empty() {
        let lower_inclusive = match rest.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(invalid()),
        };
        let close = rest.find([']', ')']).ok_or_else(invalid)?;
        let upper_inclusive = rest[close..].starts_with(']');
        let body = &rest[1..close];

        let matched = match body.split_once(',') {
            None => {
                if !(lower_inclusive && upper_inclusive) {
                    return Err(invalid());
                }
                *version == MavenVersion::parse(body)?
            }
            Some((lower, upper)) => {
                let (lower, upper) = (lower.trim(), upper.trim());
                let above = lower.is_empty() || {
                    let bound = MavenVersion::parse(lower)?;
                    if lower_inclusive {
                        *version >= bound
                    } else {
                        *version > bound
                    }
                };
                let below = upper.is_empty() || {
                    let bound = MavenVersion::parse(upper)?;
                    if upper_inclusive {
                        *version <= bound
                    } else {
                        *version < bound
                    }
                };
                above && below
            }
        };
        any |= matched;

        rest = rest[close + 1..].trim_start();
        rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
    }
    Ok(any)
}
