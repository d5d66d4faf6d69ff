//! Logwarden daemon
//!
//! Every interval: read the log file, ask the model whether it shows an
//! error, and if so file one Jira ticket assigned to the first CODEOWNERS
//! entry. Runs until SIGINT/SIGTERM, letting an in-flight run finish.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use logwarden_clients::{
    GitHubClient, GitHubConfig, JiraClient, JiraConfig, OpenAiClient, OpenAiConfig,
};
use logwarden_core::{
    ClassifierConfig, Collaborators, ErrorClassifier, FileLogSource, FingerprintStore,
    JsonFingerprintStore, ManifestLocation, MarkerGate, MemoryFingerprintStore, OwnerResolver,
    PipelineConfig, PipelineRunner, Scheduler, TicketDefaults, TicketFiler,
};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn, Level};

use crate::config::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the process environment may carry everything.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    logwarden_core::init_tracing(cli.log_json, level);

    let runner = build_runner(&cli).await?;
    let scheduler = Scheduler::new(Arc::new(runner), cli.interval());

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    info!(
        log_file = %cli.log_file.display(),
        interval_secs = cli.interval_secs,
        repo = %format!("{}/{}", cli.github_repo_owner, cli.github_repo_name),
        project = %cli.jira_project_key,
        "Log monitoring agent started"
    );

    scheduler
        .run_until(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                _ = sigint.recv() => info!("Received SIGINT"),
            }
        })
        .await;

    info!("Log monitoring agent stopped");
    Ok(())
}

/// Wire real clients and the file source into a runner.
async fn build_runner(cli: &Cli) -> Result<PipelineRunner> {
    let openai = OpenAiClient::new(
        OpenAiConfig::new(&cli.openai_api_key).with_base_url(&cli.openai_base_url),
    )
    .context("Failed to configure OpenAI client")?;

    let github = GitHubClient::new(
        GitHubConfig::new(&cli.github_token).with_api_url(&cli.github_api_url),
    )
    .context("Failed to configure GitHub client")?;

    let jira = JiraClient::new(JiraConfig::for_domain(
        &cli.jira_domain,
        &cli.jira_email,
        &cli.jira_api_token,
    ))
    .context("Failed to configure Jira client")?;

    let mut classifier_config = ClassifierConfig::default().with_model(&cli.openai_model);
    if let Some(prompt) = &cli.system_prompt {
        classifier_config = classifier_config.with_instruction(prompt);
    }

    let location = ManifestLocation::new(&cli.github_repo_owner, &cli.github_repo_name)
        .with_path(&cli.codeowners_path);

    let mut collaborators = Collaborators::new(
        Arc::new(FileLogSource::new(&cli.log_file)),
        ErrorClassifier::new(Arc::new(openai), classifier_config),
        OwnerResolver::new(Arc::new(github), location),
        TicketFiler::new(
            Arc::new(jira),
            TicketDefaults::new(&cli.jira_project_key).with_issue_type(&cli.jira_issue_type),
        ),
    )
    .with_gate(Arc::new(MarkerGate::new(&cli.error_marker)));

    if let Some(store) = open_fingerprint_store(cli).await? {
        collaborators = collaborators.with_fingerprints(store);
    }

    Ok(PipelineRunner::new(
        collaborators,
        PipelineConfig::default().with_stage_timeout(cli.stage_timeout()),
    ))
}

async fn open_fingerprint_store(cli: &Cli) -> Result<Option<Arc<dyn FingerprintStore>>> {
    let Some(ttl) = cli.dedup_ttl() else {
        if cli.dedup_state.is_some() {
            warn!("LOGWARDEN_DEDUP_STATE is set but dedup is off (no LOGWARDEN_DEDUP_TTL_SECS)");
        }
        return Ok(None);
    };

    let store: Arc<dyn FingerprintStore> = match &cli.dedup_state {
        Some(path) => {
            let store = JsonFingerprintStore::open(path, ttl)
                .await
                .with_context(|| format!("Failed to open dedup state {}", path.display()))?;
            info!(path = %path.display(), ttl_secs = ttl.num_seconds(), "Duplicate suppression enabled");
            Arc::new(store)
        }
        None => {
            info!(ttl_secs = ttl.num_seconds(), "Duplicate suppression enabled (in memory)");
            Arc::new(MemoryFingerprintStore::new(ttl))
        }
    };
    Ok(Some(store))
}
