//! Pipeline state and per-run outcome.

use serde::{Deserialize, Serialize};

use super::{Fingerprint, TicketRecord};
use crate::error::WatchError;

/// Where a run currently is. `Idle` before and after every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Idle,
    Reading,
    Classifying,
    ResolvingOwners,
    Filing,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Idle => "idle",
            RunStage::Reading => "reading",
            RunStage::Classifying => "classifying",
            RunStage::ResolvingOwners => "resolving_owners",
            RunStage::Filing => "filing",
        }
    }
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one run ended. A tick dropped by the scheduler never starts a run,
/// so it has no outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The log was read but holds nothing to classify.
    EmptyLog,

    /// The error gate rejected the classifier's reply.
    NoErrorDetected,

    /// No owner could be resolved (empty manifest or fetch failure).
    NoOwners,

    /// This condition was already ticketed within the dedup window.
    Duplicate { fingerprint: Fingerprint },

    /// A ticket was created.
    Filed(TicketRecord),

    /// A stage failed and the run went back to idle.
    Aborted { stage: RunStage, error: WatchError },
}

impl RunOutcome {
    pub fn aborted(error: WatchError) -> Self {
        RunOutcome::Aborted {
            stage: error.stage(),
            error,
        }
    }

    /// Short label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::EmptyLog => "empty_log",
            RunOutcome::NoErrorDetected => "no_error",
            RunOutcome::NoOwners => "no_owners",
            RunOutcome::Duplicate { .. } => "duplicate",
            RunOutcome::Filed(_) => "filed",
            RunOutcome::Aborted { .. } => "aborted",
        }
    }

    /// The ticket created by this run, if any.
    pub fn ticket(&self) -> Option<&TicketRecord> {
        match self {
            RunOutcome::Filed(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_takes_stage_from_error() {
        let outcome = RunOutcome::aborted(WatchError::TicketFiling("401".into()));
        match outcome {
            RunOutcome::Aborted { stage, .. } => assert_eq!(stage, RunStage::Filing),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_every_outcome_has_a_distinct_label() {
        let outcomes = [
            RunOutcome::EmptyLog,
            RunOutcome::NoErrorDetected,
            RunOutcome::NoOwners,
            RunOutcome::Duplicate {
                fingerprint: Fingerprint::of(b"ERROR boom"),
            },
            RunOutcome::Filed(TicketRecord::new("OPS-1")),
            RunOutcome::aborted(WatchError::Classification("quota".into())),
        ];
        let mut labels: Vec<_> = outcomes.iter().map(RunOutcome::label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), outcomes.len());
    }

    #[test]
    fn test_ticket_accessor() {
        let filed = RunOutcome::Filed(TicketRecord::new("OPS-1"));
        assert_eq!(filed.ticket().map(|t| t.key.as_str()), Some("OPS-1"));
        assert!(RunOutcome::NoOwners.ticket().is_none());
        assert_eq!(filed.label(), "filed");
    }
}
