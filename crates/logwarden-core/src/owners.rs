//! Ownership resolution from a repository manifest.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collaborators::RepositoryContents;
use crate::domain::OwnerManifest;
use crate::error::Result;

/// Manifest path used when none is configured.
pub const DEFAULT_MANIFEST_PATH: &str = "CODEOWNERS";

/// Which file in which repository holds the owners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestLocation {
    pub owner: String,
    pub repo: String,
    pub path: String,
}

impl ManifestLocation {
    /// `CODEOWNERS` at the root of `owner/repo`.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            path: DEFAULT_MANIFEST_PATH.to_string(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl std::fmt::Display for ManifestLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.path)
    }
}

/// Fetches and parses the ownership manifest. Fresh on every call.
pub struct OwnerResolver {
    contents: Arc<dyn RepositoryContents>,
    location: ManifestLocation,
}

impl OwnerResolver {
    pub fn new(contents: Arc<dyn RepositoryContents>, location: ManifestLocation) -> Self {
        Self { contents, location }
    }

    pub fn location(&self) -> &ManifestLocation {
        &self.location
    }

    pub async fn resolve(&self) -> Result<OwnerManifest> {
        let text = self
            .contents
            .fetch_file(&self.location.owner, &self.location.repo, &self.location.path)
            .await?;
        let manifest = OwnerManifest::parse(&text);
        debug!(location = %self.location, owners = manifest.len(), "Parsed owner manifest");
        Ok(manifest)
    }
}
