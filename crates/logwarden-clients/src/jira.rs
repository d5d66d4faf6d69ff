//! Jira Cloud issue client
//!
//! Creates issues through `POST /rest/api/3/issue` with basic auth
//! (account email + API token). Descriptions are sent as a single-paragraph
//! Atlassian Document Format document.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use logwarden_core::{IssueTracker, TicketRecord, TicketRequest, WatchError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ClientError;
use crate::http::{build_client, ensure_success, trim_base_url, DEFAULT_REQUEST_TIMEOUT};

/// Jira configuration
#[derive(Clone)]
pub struct JiraConfig {
    /// Site root, e.g. `https://acme.atlassian.net`
    pub base_url: String,
    /// Atlassian account email
    pub email: String,
    /// API token for `email`
    pub api_token: String,
    pub timeout: Duration,
}

impl JiraConfig {
    pub fn new(base_url: &str, email: &str, api_token: &str) -> Self {
        JiraConfig {
            base_url: trim_base_url(base_url),
            email: email.to_string(),
            api_token: api_token.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Build a config from a bare site domain (`acme.atlassian.net`).
    /// A value that already carries a scheme is used as-is.
    pub fn for_domain(domain: &str, email: &str, api_token: &str) -> Self {
        let domain = domain.trim();
        let base_url = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        };
        Self::new(&base_url, email, api_token)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "self")]
    self_url: Option<String>,
}

/// Issue tracker backed by the Jira Cloud REST API (v3)
pub struct JiraClient {
    config: JiraConfig,
    http_client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, ClientError> {
        if config.email.is_empty() || config.api_token.is_empty() {
            return Err(ClientError::Config(
                "Jira email and API token are required".to_string(),
            ));
        }
        let http_client = build_client(config.timeout)?;
        Ok(JiraClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// Create one issue and return its key
    pub async fn create(&self, request: &TicketRequest) -> Result<TicketRecord, ClientError> {
        let url = format!("{}/rest/api/3/issue", self.config.base_url);

        debug!(
            project = %request.project_key,
            assignee = %request.assignee,
            "Creating Jira issue"
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&issue_body(request))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let created: CreatedIssue = response.json().await?;

        Ok(TicketRecord {
            key: created.key,
            id: created.id,
            url: created.self_url,
        })
    }
}

/// Request body for `POST /rest/api/3/issue`
pub fn issue_body(request: &TicketRequest) -> Value {
    json!({
        "fields": {
            "project": { "key": request.project_key },
            "summary": request.summary,
            "description": {
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [{ "type": "text", "text": request.description }]
                }]
            },
            "issuetype": { "name": request.issue_type },
            "assignee": { "name": request.assignee }
        }
    })
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn create_issue(&self, request: &TicketRequest) -> logwarden_core::Result<TicketRecord> {
        self.create(request)
            .await
            .map_err(|e| WatchError::TicketFiling(e.to_string()))
    }
}
