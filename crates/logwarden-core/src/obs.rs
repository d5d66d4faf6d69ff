//! Structured observability hooks for the run lifecycle.
//!
//! Each run gets a span carrying its `run_id`; the `emit_*` functions log
//! named events (`event = "run.started"` etc.) so operators can grep or
//! aggregate them regardless of output format.

use std::time::Duration;

use tracing::{info, warn};

use crate::domain::{RunOutcome, RunStage, TicketRecord};
use crate::error::WatchError;

/// Span covering one run.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("logwarden.run", run_id = %run_id)
}

pub fn emit_run_started(source: &str) {
    info!(event = "run.started", source = %source, "Checking logs...");
}

/// Emit event: run entered a stage.
pub fn emit_stage(stage: RunStage) {
    tracing::debug!(event = "run.stage", stage = %stage);
}

/// Emit event: a stage failed and the run is going back to idle.
pub fn emit_stage_failed(error: &WatchError) {
    warn!(
        event = "run.stage_failed",
        stage = %error.stage(),
        error = %error,
        "Stage failed, returning to idle"
    );
}

pub fn emit_ticket_filed(record: &TicketRecord, assignee: &str) {
    info!(
        event = "ticket.filed",
        key = %record.key,
        assignee = %assignee,
        "Ticket created: {}",
        record.key
    );
}

/// Emit event: run finished with its outcome label and duration.
pub fn emit_run_finished(outcome: &RunOutcome, elapsed: Duration) {
    info!(
        event = "run.finished",
        outcome = outcome.label(),
        duration_ms = elapsed.as_millis() as u64,
    );
}

/// Emit event: a tick was dropped because a run was still in flight.
pub fn emit_run_skipped() {
    warn!(
        event = "run.skipped",
        "Previous run still in flight, skipping tick"
    );
}
