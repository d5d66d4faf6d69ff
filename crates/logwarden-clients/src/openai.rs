//! OpenAI chat completions client
//!
//! Sends one system + user exchange to `POST {base_url}/chat/completions`
//! and returns the first choice's message content.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use logwarden_core::{ChatCompletion, ChatRequest, WatchError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;
use crate::http::{build_client, ensure_success, trim_base_url, DEFAULT_REQUEST_TIMEOUT};

/// Public OpenAI API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Secret API key, sent as a bearer token
    pub api_key: String,
    /// API root, without the trailing `/chat/completions`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: &str) -> Self {
        OpenAiConfig {
            api_key: api_key.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Point at a compatible server (proxy, Azure gateway, test double)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Chat completion client backed by the OpenAI HTTP API
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, ClientError> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::Config("OpenAI API key is empty".to_string()));
        }
        let http_client = build_client(config.timeout)?;
        Ok(OpenAiClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Run one completion, returning the raw first-choice text
    pub async fn chat(&self, request: &ChatRequest) -> Result<String, ClientError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = CompletionBody {
            model: &request.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        debug!(model = %request.model, chars = request.user.len(), "Requesting chat completion");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let parsed: CompletionResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| ClientError::Decode("response has no choices".to_string()))
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> logwarden_core::Result<String> {
        self.chat(&request)
            .await
            .map_err(|e| WatchError::Classification(e.to_string()))
    }
}
