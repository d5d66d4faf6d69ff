//! Detection-to-ticket pipeline.
//!
//! One run walks the stages in a fixed order:
//!
//! ```text
//! Idle → Reading → Classifying → (abort→Idle | ResolvingOwners) → (abort→Idle | Filing) → Idle
//! ```
//!
//! Every stage failure, negative gate or empty result sends the run straight
//! back to `Idle` with a single log line. Nothing is retried and nothing
//! escapes [`PipelineRunner::run_once`].

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::classifier::ErrorClassifier;
use crate::collaborators::LogSource;
use crate::dedup::FingerprintStore;
use crate::domain::{OwnerManifest, RunOutcome, RunStage};
use crate::error::{Result, WatchError};
use crate::filer::TicketFiler;
use crate::gate::{ErrorGate, MarkerGate};
use crate::obs;
use crate::owners::OwnerResolver;

/// Per-stage time budget used when none is configured.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Runner tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound for each suspending stage call.
    pub stage_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }
}

/// Long-lived handles the pipeline runs against.
pub struct Collaborators {
    pub source: Arc<dyn LogSource>,
    pub classifier: ErrorClassifier,
    pub gate: Arc<dyn ErrorGate>,
    pub owners: OwnerResolver,
    pub filer: TicketFiler,
    /// `None` disables duplicate suppression.
    pub fingerprints: Option<Arc<dyn FingerprintStore>>,
}

impl Collaborators {
    /// Marker gate with the default token, no duplicate suppression.
    pub fn new(
        source: Arc<dyn LogSource>,
        classifier: ErrorClassifier,
        owners: OwnerResolver,
        filer: TicketFiler,
    ) -> Self {
        Self {
            source,
            classifier,
            gate: Arc::new(MarkerGate::default()),
            owners,
            filer,
            fingerprints: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<dyn ErrorGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_fingerprints(mut self, store: Arc<dyn FingerprintStore>) -> Self {
        self.fingerprints = Some(store);
        self
    }
}

/// Executes single runs. Holds no state between runs.
pub struct PipelineRunner {
    collaborators: Collaborators,
    config: PipelineConfig,
}

impl PipelineRunner {
    pub fn new(collaborators: Collaborators, config: PipelineConfig) -> Self {
        Self {
            collaborators,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline once. Always returns an outcome; never panics on a
    /// collaborator failure.
    pub async fn run_once(&self) -> RunOutcome {
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id);
        let started = Instant::now();

        let outcome = self.execute().instrument(span.clone()).await;

        span.in_scope(|| obs::emit_run_finished(&outcome, started.elapsed()));
        outcome
    }

    async fn execute(&self) -> RunOutcome {
        let c = &self.collaborators;
        obs::emit_run_started(&c.source.describe());

        obs::emit_stage(RunStage::Reading);
        let snapshot = match self.bounded(RunStage::Reading, c.source.read()).await {
            Ok(snapshot) => snapshot,
            Err(e) => return abort(e),
        };
        if snapshot.is_empty() {
            info!(source = %snapshot.source(), "Log is empty, nothing to analyse");
            return RunOutcome::EmptyLog;
        }

        obs::emit_stage(RunStage::Classifying);
        let assessment = match self
            .bounded(RunStage::Classifying, c.classifier.classify(&snapshot))
            .await
        {
            Ok(assessment) => assessment,
            Err(e) => return abort(e),
        };
        if !c.gate.indicates_error(&assessment) {
            info!("No error detected in logs");
            return RunOutcome::NoErrorDetected;
        }

        obs::emit_stage(RunStage::ResolvingOwners);
        let owners = match self
            .bounded(RunStage::ResolvingOwners, c.owners.resolve())
            .await
        {
            Ok(owners) => owners,
            Err(e) => {
                // Indistinguishable from an empty manifest for gating purposes.
                obs::emit_stage_failed(&e);
                OwnerManifest::default()
            }
        };
        if owners.is_empty() {
            info!(location = %c.owners.location(), "No code owners found");
            return RunOutcome::NoOwners;
        }

        obs::emit_stage(RunStage::Filing);
        let fingerprint = snapshot.fingerprint();
        if let Some(store) = &c.fingerprints {
            match self
                .bounded(RunStage::Filing, store.is_recent(&fingerprint, Utc::now()))
                .await
            {
                Ok(true) => {
                    info!(
                        fingerprint = %fingerprint.short(),
                        "Same log content already ticketed, not filing again"
                    );
                    return RunOutcome::Duplicate { fingerprint };
                }
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Fingerprint lookup failed, filing anyway"),
            }
        }

        let record = match self
            .bounded(RunStage::Filing, c.filer.file(&assessment, &owners))
            .await
        {
            Ok(record) => record,
            Err(e) => return abort(e),
        };
        obs::emit_ticket_filed(&record, owners.primary().unwrap_or_default());

        if let Some(store) = &c.fingerprints {
            if let Err(e) = self
                .bounded(RunStage::Filing, store.record(&fingerprint, Utc::now()))
                .await
            {
                warn!(error = %e, "Failed to remember filed fingerprint");
            }
        }

        RunOutcome::Filed(record)
    }

    async fn bounded<T, F>(&self, stage: RunStage, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let timeout = self.config.stage_timeout;
        tokio::time::timeout(timeout, fut)
            .await
            .unwrap_or(Err(WatchError::Timeout { stage, timeout }))
    }
}

fn abort(error: WatchError) -> RunOutcome {
    obs::emit_stage_failed(&error);
    RunOutcome::aborted(error)
}
