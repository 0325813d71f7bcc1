//! Container image identifiers built from repository digests.

use super::{PackageUrl, Qualifiers};
use crate::error::{Result, ScaError};
use crate::model::{Metadata, PkgType};

const DEFAULT_REGISTRY: &str = "index.docker.io";
const DEFAULT_NAMESPACE: &str = "library";
const DIGEST_PREFIX: &str = "sha256:";
const REPOSITORY_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789_-./";

/// A parsed `[registry/]repository[:tag]@sha256:<hex>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    registry: String,
    repository: String,
    digest: String,
}

impl Digest {
    /// Parse a digest reference, applying Docker Hub defaults.
    pub fn parse(reference: &str) -> Result<Self> {
        let mut parts = reference.split('@');
        let (Some(base), Some(digest), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ScaError::invalid_digest(
                reference,
                "a digest must contain exactly one '@' separator",
            ));
        };

        let hex = digest.strip_prefix(DIGEST_PREFIX).ok_or_else(|| {
            ScaError::invalid_digest(reference, format!("unsupported digest algorithm: {digest}"))
        })?;
        if hex.len() != 64 || !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(ScaError::invalid_digest(
                reference,
                "digest must be 64 lowercase hex characters",
            ));
        }

        let base = strip_tag(base);
        let (registry, repository) = match base.split_once('/') {
            Some((host, rest))
                if host.contains('.') || host.contains(':') || host == "localhost" =>
            {
                (host.to_string(), rest.to_string())
            }
            _ => (DEFAULT_REGISTRY.to_string(), base.to_string()),
        };
        let repository = if registry == DEFAULT_REGISTRY && !repository.contains('/') {
            format!("{DEFAULT_NAMESPACE}/{repository}")
        } else {
            repository
        };

        if repository.is_empty()
            || repository.starts_with('/')
            || repository.ends_with('/')
            || !repository.chars().all(|c| REPOSITORY_CHARS.contains(c))
        {
            return Err(ScaError::invalid_digest(
                reference,
                format!("repository can only contain the characters `{REPOSITORY_CHARS}`"),
            ));
        }

        Ok(Self {
            registry,
            repository,
            digest: digest.to_string(),
        })
    }

    /// Repository path without the registry, e.g. `library/alpine`.
    #[must_use]
    pub fn repository_str(&self) -> &str {
        &self.repository
    }

    /// Fully qualified repository, e.g. `index.docker.io/library/alpine`.
    #[must_use]
    pub fn repository_name(&self) -> String {
        format!("{}/{}", self.registry, self.repository)
    }

    #[must_use]
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// `sha256:<hex>`
    #[must_use]
    pub fn digest_str(&self) -> &str {
        &self.digest
    }
}

/// Drop a `:tag` suffix that follows the last path separator.
fn strip_tag(base: &str) -> &str {
    let last_segment = base.rfind('/').map_or(0, |i| i + 1);
    match base[last_segment..].rfind(':') {
        Some(i) => &base[..last_segment + i],
        None => base,
    }
}

pub(super) fn encode(metadata: &Metadata) -> Result<Option<PackageUrl>> {
    let Some(first) = metadata.repo_digests.first() else {
        return Ok(None);
    };
    let digest = Digest::parse(first)?;

    let repository = digest.repository_str().to_lowercase();
    let name = repository
        .rsplit_once('/')
        .map_or(repository.as_str(), |(_, name)| name);

    let mut qualifiers = Qualifiers::new();
    qualifiers.push("repository_url", digest.repository_name());
    if !metadata.image_config.architecture.is_empty() {
        qualifiers.push("arch", metadata.image_config.architecture.as_str());
    }

    PackageUrl::new(
        PkgType::Oci.as_str(),
        "",
        name,
        digest.digest_str(),
        qualifiers,
        "",
    )
    .map(Some)
}
