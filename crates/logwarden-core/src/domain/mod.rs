//! Domain models for Logwarden.
//!
//! Canonical definitions for the per-run entities:
//! - `LogSnapshot`: full log text captured at one read
//! - `ErrorAssessment`: the classifier's verbatim verdict
//! - `OwnerManifest`: owner handles parsed from a CODEOWNERS-style file
//! - `TicketRequest` / `TicketRecord`: what we file and what the tracker returns
//! - `RunStage` / `RunOutcome`: pipeline state and terminal result

pub mod assessment;
pub mod fingerprint;
pub mod manifest;
pub mod run;
pub mod snapshot;
pub mod ticket;

pub use assessment::ErrorAssessment;
pub use fingerprint::Fingerprint;
pub use manifest::OwnerManifest;
pub use run::{RunOutcome, RunStage};
pub use snapshot::LogSnapshot;
pub use ticket::{TicketRecord, TicketRequest};
