//! RPM-style version strings.

use std::fmt;

/// An `[epoch:]version[-release]` triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RpmVersion {
    pub epoch: u32,
    pub version: String,
    pub release: String,
}

impl RpmVersion {
    /// Split a combined RPM version string.
    ///
    /// The epoch is everything before the first `:`, the release everything
    /// after the last `-`. A non-numeric epoch is treated as zero.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let (epoch, rest) = match s.split_once(':') {
            Some((epoch, rest)) => (epoch.parse().unwrap_or(0), rest),
            None => (0, s),
        };
        let (version, release) = match rest.rsplit_once('-') {
            Some((version, release)) => (version, release),
            None => (rest, ""),
        };
        Self {
            epoch,
            version: version.to_string(),
            release: release.to_string(),
        }
    }
}

impl fmt::Display for RpmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_version(self.epoch, &self.version, &self.release))
    }
}

/// Format `[epoch:]version[-release]`, omitting a zero epoch and empty release.
#[must_use]
pub fn format_version(epoch: u32, version: &str, release: &str) -> String {
    let mut out = String::with_capacity(version.len() + release.len() + 4);
    if epoch != 0 {
        out.push_str(&epoch.to_string());
        out.push(':');
    }
    out.push_str(version);
    if !release.is_empty() {
        out.push('-');
        out.push_str(release);
    }
    out
}
