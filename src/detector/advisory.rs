//! Advisory sources.

use crate::error::{AdvisoryErrorKind, Result, ScaError};
use crate::model::Advisory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;

/// Query contract of an advisory database.
///
/// Implementations must be safe to query concurrently; the driver performs
/// no caching or retries of its own.
pub trait AdvisorySource: Send + Sync {
    /// Advisories for `name` from every bucket whose name starts with
    /// `prefix` (e.g. `"npm::"`).
    fn get_advisories(&self, prefix: &str, name: &str) -> Result<Vec<Advisory>>;
}

/// In-memory advisory database.
///
/// Buckets are named `"<ecosystem>::<data source>"` and are visited in
/// lexical order, so results are deterministic.
///
/// ```json
/// {
///   "buckets": {
///     "npm::GitHub Security Advisory npm": {
///       "lodash": [{"VulnerabilityID": "CVE-2021-23337", "VulnerableVersions": ["<4.17.21"]}]
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryAdvisoryStore {
    #[serde(default)]
    buckets: BTreeMap<String, BTreeMap<String, Vec<Advisory>>>,
}

impl MemoryAdvisoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an advisory for `name` to `bucket`.
    pub fn insert(&mut self, bucket: impl Into<String>, name: impl Into<String>, advisory: Advisory) {
        self.buckets
            .entry(bucket.into())
            .or_default()
            .entry(name.into())
            .or_default()
            .push(advisory);
    }

    /// Parse a JSON advisory database.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            ScaError::advisory("invalid advisory database", AdvisoryErrorKind::Load(e.to_string()))
        })
    }

    /// Load a JSON advisory database from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScaError::io(path, e))?;
        let store = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            buckets = store.bucket_count(),
            "Loaded advisory database"
        );
        Ok(store)
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn advisory_count(&self) -> usize {
        self.buckets
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

impl AdvisorySource for MemoryAdvisoryStore {
    fn get_advisories(&self, prefix: &str, name: &str) -> Result<Vec<Advisory>> {
        Ok(self
            .buckets
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(bucket, _)| bucket.starts_with(prefix))
            .filter_map(|(_, packages)| packages.get(name))
            .flatten()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_buckets_with_prefix() {
        let mut store = MemoryAdvisoryStore::new();
        store.insert("pip::PyPA", "django", Advisory::new("CVE-B"));
        store.insert("pip::GitHub", "django", Advisory::new("CVE-A"));
        store.insert("npm::GitHub", "django", Advisory::new("CVE-X"));
        store.insert("pipx::Other", "django", Advisory::new("CVE-Y"));

        let ids: Vec<_> = store
            .get_advisories("pip::", "django")
            .expect("ok")
            .into_iter()
            .map(|a| a.vulnerability_id)
            .collect();
        assert_eq!(ids, vec!["CVE-A", "CVE-B"]);
        assert_eq!(store.advisory_count(), 4);
    }

    #[test]
    fn test_prefix_range_bounds() {
        let mut store = MemoryAdvisoryStore::new();
        store.insert("gem::Ruby Advisory Database", "rack", Advisory::new("CVE-G"));
        store.insert("npm::GitHub", "rack", Advisory::new("CVE-N"));

        let all = store.get_advisories("", "rack").expect("ok");
        assert_eq!(all.len(), 2);
        assert!(store.get_advisories("pip::", "rack").expect("ok").is_empty());
        assert!(store.get_advisories("a::", "rack").expect("ok").is_empty());
    }

    #[test]
    fn test_unknown_package_is_empty() {
        let store = MemoryAdvisoryStore::new();
        assert!(store.get_advisories("npm::", "lodash").expect("ok").is_empty());
    }

    #[test]
    fn test_from_json() {
        let store = MemoryAdvisoryStore::from_json_str(
            r#"{"buckets": {"npm::GitHub Security Advisory npm": {"lodash": [
                {"VulnerabilityID": "CVE-2021-23337", "VulnerableVersions": ["<4.17.21"],
                 "DataSource": {"ID": "ghsa", "Name": "GitHub Security Advisory npm", "URL": "https://github.com/advisories"}}
            ]}}}"#,
        )
        .expect("valid database");
        let advisories = store.get_advisories("npm::", "lodash").expect("ok");
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].vulnerable_versions, vec!["<4.17.21"]);
        assert_eq!(
            advisories[0].data_source.as_ref().map(|d| d.id.as_str()),
            Some("ghsa")
        );
    }

    #[test]
    fn test_invalid_json_is_load_error() {
        let err = MemoryAdvisoryStore::from_json_str("{").expect_err("invalid");
        assert!(matches!(
            err,
            ScaError::Advisory {
                source: AdvisoryErrorKind::Load(_),
                ..
            }
        ));
    }
}
