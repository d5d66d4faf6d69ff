//! Daemon configuration, read from flags or the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use logwarden_clients::{DEFAULT_GITHUB_API_URL, DEFAULT_OPENAI_BASE_URL};
use logwarden_core::classifier::DEFAULT_MODEL;
use logwarden_core::domain::ticket::DEFAULT_ISSUE_TYPE;
use logwarden_core::gate::DEFAULT_ERROR_MARKER;
use logwarden_core::owners::DEFAULT_MANIFEST_PATH;
use logwarden_core::pipeline::DEFAULT_STAGE_TIMEOUT;
use logwarden_core::scheduler::DEFAULT_INTERVAL;

#[derive(Parser, Debug)]
#[command(name = "logwardend")]
#[command(author = "Logwarden Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Watch a log file and ticket detected errors to their code owners", long_about = None)]
pub struct Cli {
    /// Log file to monitor
    #[arg(long, env = "LOG_FILE_PATH")]
    pub log_file: PathBuf,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Chat model used to classify log text
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub openai_model: String,

    /// OpenAI-compatible API root
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Replace the built-in classifier instruction
    #[arg(long, env = "LOGWARDEN_SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    /// GitHub token used to read the ownership manifest
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Repository owner (user or organisation)
    #[arg(long, env = "GITHUB_REPO_OWNER")]
    pub github_repo_owner: String,

    /// Repository name
    #[arg(long, env = "GITHUB_REPO_NAME")]
    pub github_repo_name: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    pub github_api_url: String,

    /// Manifest path inside the repository
    #[arg(long, env = "CODEOWNERS_PATH", default_value = DEFAULT_MANIFEST_PATH)]
    pub codeowners_path: String,

    /// Jira site domain, e.g. acme.atlassian.net
    #[arg(long, env = "JIRA_DOMAIN")]
    pub jira_domain: String,

    #[arg(long, env = "JIRA_PROJECT_KEY")]
    pub jira_project_key: String,

    #[arg(long, env = "JIRA_EMAIL")]
    pub jira_email: String,

    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub jira_api_token: String,

    #[arg(long, env = "JIRA_ISSUE_TYPE", default_value = DEFAULT_ISSUE_TYPE)]
    pub jira_issue_type: String,

    /// Seconds between checks
    #[arg(
        long,
        env = "LOGWARDEN_INTERVAL_SECS",
        default_value_t = DEFAULT_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Upper bound for each suspending stage of a run
    #[arg(
        long,
        env = "LOGWARDEN_STAGE_TIMEOUT_SECS",
        default_value_t = DEFAULT_STAGE_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub stage_timeout_secs: u64,

    /// Token the classifier reply must contain to count as an error
    #[arg(long, env = "LOGWARDEN_ERROR_MARKER", default_value = DEFAULT_ERROR_MARKER)]
    pub error_marker: String,

    /// Suppress repeat tickets for unchanged log content within this window
    #[arg(
        long,
        env = "LOGWARDEN_DEDUP_TTL_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub dedup_ttl_secs: Option<u64>,

    /// Persist dedup fingerprints to this JSON file
    #[arg(long, env = "LOGWARDEN_DEDUP_STATE")]
    pub dedup_state: Option<PathBuf>,

    /// Emit JSON-formatted log lines
    #[arg(long, env = "LOGWARDEN_LOG_JSON")]
    pub log_json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    /// Dedup window, when dedup is enabled.
    pub fn dedup_ttl(&self) -> Option<chrono::Duration> {
        self.dedup_ttl_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(chrono::Duration::try_seconds)
    }
}
