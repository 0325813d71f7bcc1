//! Shared constraint grammar.
//!
//! ```text
//! constraint := group ( "||" group )*
//! group      := term ( "," term )*
//! term       := [operator] version
//! operator   := "=" | "==" | "!=" | ">" | "<" | ">=" | "<=" | "~>" | "^" | "~"
//! ```
//!
//! A term without an operator means equality.

use super::ConstraintError;
use std::fmt;

/// Comparison operator of one constraint term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    /// `~>`: at least this version, below the next release of the
    /// second-to-last given segment
    Pessimistic,
    /// `^`: at least this version, below the next release of the first
    /// non-zero segment
    Caret,
    /// `~`: at least this version, below the next minor (or major when only
    /// the major is given)
    Tilde,
}

impl Operator {
    // longest first so that ">=" is not read as ">"
    const TOKENS: [(&'static str, Self); 10] = [
        ("~>", Self::Pessimistic),
        (">=", Self::Ge),
        ("<=", Self::Le),
        ("!=", Self::Ne),
        ("==", Self::Eq),
        ("=", Self::Eq),
        (">", Self::Gt),
        ("<", Self::Lt),
        ("^", Self::Caret),
        ("~", Self::Tilde),
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Pessimistic => "~>",
            Self::Caret => "^",
            Self::Tilde => "~",
        }
    }

    /// Whether the operator needs an exclusive upper bound.
    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(self, Self::Pessimistic | Self::Caret | Self::Tilde)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `operator version` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator<'a> {
    pub op: Operator,
    pub version: &'a str,
}

impl<'a> Comparator<'a> {
    pub fn parse(term: &'a str) -> Result<Self, ConstraintError> {
        let term = term.trim();
        let (op, rest) = Operator::TOKENS
            .iter()
            .find_map(|(token, op)| term.strip_prefix(token).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Eq, term));
        let version = rest.trim();
        if version.is_empty() {
            return Err(ConstraintError::InvalidConstraint(term.to_string()));
        }
        Ok(Self { op, version })
    }
}

/// The `||`-separated alternatives of a constraint.
pub fn or_groups(constraint: &str) -> impl Iterator<Item = &str> {
    constraint.split("||").map(str::trim)
}

/// The `,`-separated terms of one group, empty terms dropped.
pub fn and_terms(group: &str) -> impl Iterator<Item = &str> {
    group.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// A totally ordered version usable with the shared grammar.
pub trait Versioned: Ord + Sized {
    /// Short scheme name for error messages.
    const SCHEME: &'static str;

    fn parse(s: &str) -> Result<Self, ConstraintError>;

    /// Exclusive upper bound of a range operator applied to `self`, or
    /// `None` if the scheme has no such operator.
    fn upper_bound(&self, op: Operator) -> Option<Self>;
}

/// Evaluate `constraint` against an already parsed version.
pub fn satisfies<V: Versioned>(version: &V, constraint: &str) -> Result<bool, ConstraintError> {
    let mut any = false;
    for group in or_groups(constraint) {
        let mut terms = and_terms(group).peekable();
        if terms.peek().is_none() {
            return Err(ConstraintError::InvalidConstraint(constraint.to_string()));
        }
        let mut all = true;
        for term in terms {
            // every term is parsed so that a malformed constraint is always
            // reported, whichever group matches
            all &= term_matches(version, Comparator::parse(term)?)?;
        }
        any |= all;
    }
    Ok(any)
}

fn term_matches<V: Versioned>(version: &V, term: Comparator<'_>) -> Result<bool, ConstraintError> {
    let bound = V::parse(term.version)?;
    let matched = match term.op {
        Operator::Eq => *version == bound,
        Operator::Ne => *version != bound,
        Operator::Gt => *version > bound,
        Operator::Lt => *version < bound,
        Operator::Ge => *version >= bound,
        Operator::Le => *version <= bound,
        op => {
            let upper = bound
                .upper_bound(op)
                .ok_or(ConstraintError::UnsupportedOperator {
                    op: op.to_string(),
                    scheme: V::SCHEME,
                })?;
            *version >= bound && *version < upper
        }
    };
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comparator() {
        let c = Comparator::parse(">= 1.2.3").expect("valid");
        assert_eq!(c.op, Operator::Ge);
        assert_eq!(c.version, "1.2.3");

        let c = Comparator::parse("~>2.0").expect("valid");
        assert_eq!(c.op, Operator::Pessimistic);

        let c = Comparator::parse("1.0").expect("valid");
        assert_eq!(c.op, Operator::Eq);

        let c = Comparator::parse("==1.0").expect("valid");
        assert_eq!(c.op, Operator::Eq);
        assert_eq!(c.version, "1.0");

        assert!(Comparator::parse("<=").is_err());
    }

    #[test]
    fn test_split_groups_and_terms() {
        let groups: Vec<_> = or_groups("<1.0 || >=2.0, <2.5").collect();
        assert_eq!(groups, vec!["<1.0", ">=2.0, <2.5"]);
        let terms: Vec<_> = and_terms(groups[1]).collect();
        assert_eq!(terms, vec![">=2.0", "<2.5"]);
    }
}
