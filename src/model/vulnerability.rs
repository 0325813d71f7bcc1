//! Advisories consumed from an advisory source and the matches derived from them.

use serde::{Deserialize, Serialize};

/// Provenance of an advisory. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSource {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// A vulnerability record scoped to one ecosystem and package name.
///
/// Range entries are constraint expressions such as `">=1.0.0, <1.2.3"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Advisory {
    #[serde(rename = "VulnerabilityID")]
    pub vulnerability_id: String,
    #[serde(rename = "VulnerableVersions", skip_serializing_if = "Vec::is_empty")]
    pub vulnerable_versions: Vec<String>,
    #[serde(rename = "PatchedVersions", skip_serializing_if = "Vec::is_empty")]
    pub patched_versions: Vec<String>,
    #[serde(rename = "UnaffectedVersions", skip_serializing_if = "Vec::is_empty")]
    pub unaffected_versions: Vec<String>,
    #[serde(rename = "DataSource", skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
}

impl Advisory {
    pub fn new(vulnerability_id: impl Into<String>) -> Self {
        Self {
            vulnerability_id: vulnerability_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn vulnerable<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vulnerable_versions = ranges.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn patched<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patched_versions = ranges.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn unaffected<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unaffected_versions = ranges.into_iter().map(Into::into).collect();
        self
    }
}

/// An advisory that applies to an installed package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedVulnerability {
    pub vulnerability_id: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub pkg_id: String,
    pub pkg_name: String,
    pub installed_version: String,
    /// Best-effort; may be empty
    #[serde(default)]
    pub fixed_version: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data_source: Option<DataSource>,
}
