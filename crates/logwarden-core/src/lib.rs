//! Logwarden Core
//!
//! The detection-to-ticket pipeline: read a log, ask a language model
//! whether it shows an error, resolve code owners, file one ticket.
//!
//! ## Key Components
//!
//! - `PipelineRunner`: one gated run over the four stages
//! - `Scheduler`: fixed-cadence trigger with a single-flight run lock
//! - `ErrorClassifier`, `OwnerResolver`, `TicketFiler`: the stages
//! - `collaborators`: traits for the outside world (LLM, source host, tracker)
//! - `fakes`: in-memory collaborator implementations for tests

pub mod classifier;
pub mod collaborators;
pub mod dedup;
pub mod domain;
mod error;
pub mod fakes;
pub mod filer;
pub mod gate;
pub mod obs;
pub mod owners;
pub mod pipeline;
pub mod scheduler;
pub mod source;
pub mod telemetry;

pub use classifier::{ClassifierConfig, ErrorClassifier};
pub use collaborators::{ChatCompletion, ChatRequest, IssueTracker, LogSource, RepositoryContents};
pub use dedup::{FingerprintStore, JsonFingerprintStore, MemoryFingerprintStore};
pub use domain::{
    ErrorAssessment, Fingerprint, LogSnapshot, OwnerManifest, RunOutcome, RunStage, TicketRecord,
    TicketRequest,
};
pub use error::{Result, WatchError};
pub use filer::{TicketDefaults, TicketFiler};
pub use gate::{ErrorGate, MarkerGate};
pub use owners::{ManifestLocation, OwnerResolver};
pub use pipeline::{Collaborators, PipelineConfig, PipelineRunner};
pub use scheduler::Scheduler;
pub use source::FileLogSource;
pub use telemetry::init_tracing;
