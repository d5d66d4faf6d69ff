//! Capability traits the pipeline consumes.
//!
//! These are the seams to the outside world:
//! - `LogSource`: read the monitored log
//! - `ChatCompletion`: one system+user exchange with a language model
//! - `RepositoryContents`: fetch a decoded file from a source host
//! - `IssueTracker`: create an issue
//!
//! Real implementations live in `logwarden-clients` (and `FileLogSource`
//! here); in-memory fakes for tests live in [`crate::fakes`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{LogSnapshot, TicketRecord, TicketRequest};
use crate::error::Result;

/// Source of log text.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Read the full current content. Any failure is a `WatchError::Read`.
    async fn read(&self) -> Result<LogSnapshot>;

    /// Human-readable name for log lines (usually the path).
    fn describe(&self) -> String;
}

/// A single chat completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    /// System instruction.
    pub system: String,
    /// User message (the log text).
    pub user: String,
}

/// Language-model completion capability.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Return the text of the first reply choice.
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}

/// Source-code host file access.
#[async_trait]
pub trait RepositoryContents: Send + Sync {
    /// Fetch `path` from `owner/repo` and return it decoded to text.
    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> Result<String>;
}

/// Issue tracker capability.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_issue(&self, request: &TicketRequest) -> Result<TicketRecord>;
}
