//! Logwarden Clients
//!
//! reqwest-backed implementations of the `logwarden-core` collaborator traits:
//!
//! - `OpenAiClient`: `ChatCompletion` over the chat completions API
//! - `GitHubClient`: `RepositoryContents` over the REST contents endpoint
//! - `JiraClient`: `IssueTracker` over the Jira Cloud v3 issue API

pub mod error;
pub mod github;
mod http;
pub mod jira;
pub mod openai;

pub use error::ClientError;
pub use github::{GitHubClient, GitHubConfig, DEFAULT_GITHUB_API_URL};
pub use http::DEFAULT_REQUEST_TIMEOUT;
pub use jira::{JiraClient, JiraConfig};
pub use openai::{OpenAiClient, OpenAiConfig, DEFAULT_OPENAI_BASE_URL};
