//! Shared reqwest plumbing.

use std::time::Duration;

use crate::error::ClientError;

pub(crate) const USER_AGENT: &str = concat!("logwarden/", env!("CARGO_PKG_VERSION"));

/// Request timeout applied when a config leaves it unset.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest response body we keep in an error message.
const MAX_ERROR_BODY: usize = 512;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))
}

/// Pass a success response through; turn anything else into `ClientError::Status`.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body: truncate(&body, MAX_ERROR_BODY),
    })
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
