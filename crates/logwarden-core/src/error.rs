//! Error types for logwarden-core

use std::time::Duration;

use thiserror::Error;

use crate::domain::RunStage;

/// Result type for pipeline stage operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Failures a single pipeline stage can report.
///
/// Every variant is local to the stage that produced it; the runner turns
/// each one into an abort-to-idle outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    /// Log file missing, unreadable or not valid UTF-8
    #[error("Failed to read log {source_name}: {reason}")]
    Read { source_name: String, reason: String },

    /// Classifier call failed (network, auth, quota) or returned nothing
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Ownership manifest could not be fetched
    #[error("Owner manifest fetch failed: {0}")]
    OwnerFetch(String),

    /// Ownership manifest could not be decoded
    #[error("Owner manifest parse failed: {0}")]
    OwnerParse(String),

    /// Tracker rejected or never received the ticket
    #[error("Ticket filing failed: {0}")]
    TicketFiling(String),

    /// Stage exceeded its time budget
    #[error("Stage {stage} timed out after {timeout:?}")]
    Timeout { stage: RunStage, timeout: Duration },

    /// Fingerprint store lookup or write failed
    #[error("Fingerprint store error: {0}")]
    Dedup(String),
}

impl WatchError {
    /// Stage this error belongs to.
    pub fn stage(&self) -> RunStage {
        match self {
            WatchError::Read { .. } => RunStage::Reading,
            WatchError::Classification(_) => RunStage::Classifying,
            WatchError::OwnerFetch(_) | WatchError::OwnerParse(_) => RunStage::ResolvingOwners,
            WatchError::TicketFiling(_) | WatchError::Dedup(_) => RunStage::Filing,
            WatchError::Timeout { stage, .. } => *stage,
        }
    }
}
