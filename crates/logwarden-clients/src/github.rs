//! GitHub repository contents client
//!
//! Fetches a single file through the REST contents endpoint and decodes
//! its base64 payload to text.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use logwarden_core::{RepositoryContents, WatchError};
use serde::Deserialize;
use tracing::debug;

use crate::error::ClientError;
use crate::http::{build_client, ensure_success, trim_base_url, DEFAULT_REQUEST_TIMEOUT};

/// Public GitHub REST API root.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub configuration
#[derive(Clone)]
pub struct GitHubConfig {
    /// Personal access or app token
    pub token: String,
    /// REST API root (GitHub Enterprise uses `https://host/api/v3`)
    pub api_url: String,
    pub timeout: Duration,
}

impl GitHubConfig {
    pub fn new(token: &str) -> Self {
        GitHubConfig {
            token: token.to_string(),
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = trim_base_url(api_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// File entry from the contents endpoint. Directories come back as an
/// array and fail to deserialize into this.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Repository contents client backed by the GitHub REST API
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self, ClientError> {
        let http_client = build_client(config.timeout)?;
        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Fetch `path` from `owner/repo` on the default branch, decoded to UTF-8
    pub async fn get_file(&self, owner: &str, repo: &str, path: &str) -> Result<String, ClientError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_url,
            owner,
            repo,
            path.trim_start_matches('/')
        );

        debug!(%url, "Fetching repository file");

        let mut request = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        if !self.config.token.is_empty() {
            request = request.bearer_auth(&self.config.token);
        }

        let response = ensure_success(request.send().await?).await?;
        let entry: ContentEntry = response.json().await?;
        decode_entry(entry)
    }
}

fn decode_entry(entry: ContentEntry) -> Result<String, ClientError> {
    match entry.encoding.as_deref() {
        Some("base64") | None => {}
        Some(other) => {
            return Err(ClientError::Decode(format!(
                "unsupported content encoding: {other}"
            )))
        }
    }
    let content = entry
        .content
        .ok_or_else(|| ClientError::Decode("entry has no content".to_string()))?;

    // GitHub wraps base64 at 60 columns.
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ClientError::Decode(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ClientError::Decode(format!("not UTF-8: {e}")))
}

#[async_trait]
impl RepositoryContents for GitHubClient {
    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> logwarden_core::Result<String> {
        self.get_file(owner, repo, path).await.map_err(|e| match e {
            ClientError::Decode(msg) => WatchError::OwnerParse(msg),
            other => WatchError::OwnerFetch(other.to_string()),
        })
    }
}
