//! Integration tests for run gating and failure isolation with in-memory fakes.

use std::sync::Arc;
use std::time::Duration;

use logwarden_core::fakes::{
    BrokenFingerprintStore, RecordingTracker, ScriptedChat, StaticContents, StaticLogSource,
};
use logwarden_core::{
    ClassifierConfig, Collaborators, ErrorClassifier, ManifestLocation, MarkerGate,
    MemoryFingerprintStore, OwnerResolver, PipelineConfig, PipelineRunner, RunOutcome, RunStage,
    TicketDefaults, TicketFiler, WatchError,
};

const OWNERS: &str = "# CODEOWNERS\n\n* @alice\n/api/ @bob\n";

/// Handles to every fake so tests can inspect calls after a run.
struct Harness {
    source: Arc<StaticLogSource>,
    chat: Arc<ScriptedChat>,
    contents: Arc<StaticContents>,
    tracker: Arc<RecordingTracker>,
}

impl Harness {
    fn new(log: &str, reply: &str, manifest: &str) -> Self {
        Self::with(
            StaticLogSource::new(log),
            ScriptedChat::replying(reply),
            StaticContents::with_file("acme", "shop", "CODEOWNERS", manifest),
            RecordingTracker::new(),
        )
    }

    fn with(
        source: StaticLogSource,
        chat: ScriptedChat,
        contents: StaticContents,
        tracker: RecordingTracker,
    ) -> Self {
        Self {
            source: Arc::new(source),
            chat: Arc::new(chat),
            contents: Arc::new(contents),
            tracker: Arc::new(tracker),
        }
    }

    fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.source.clone(),
            ErrorClassifier::new(self.chat.clone(), ClassifierConfig::default()),
            OwnerResolver::new(self.contents.clone(), ManifestLocation::new("acme", "shop")),
            TicketFiler::new(self.tracker.clone(), TicketDefaults::new("OPS")),
        )
    }

    fn runner(&self) -> PipelineRunner {
        PipelineRunner::new(self.collaborators(), PipelineConfig::default())
    }
}

/// Test: a reply without the marker never reaches owners or the tracker
#[tokio::test]
async fn test_no_marker_means_no_owner_fetch_and_no_ticket() {
    let h = Harness::new("INFO all good", "The log looks healthy.", OWNERS);

    let outcome = h.runner().run_once().await;

    assert_eq!(outcome, RunOutcome::NoErrorDetected);
    assert_eq!(h.chat.requests().len(), 1);
    assert_eq!(h.contents.fetch_count(), 0);
    assert!(h.tracker.requests().is_empty());
}

/// Test: a reply with the marker fetches owners exactly once
#[tokio::test]
async fn test_marker_triggers_single_owner_fetch() {
    let h = Harness::new("ERROR boom", "Error: boom\nDOD: no boom", OWNERS);

    let outcome = h.runner().run_once().await;

    assert!(matches!(outcome, RunOutcome::Filed(_)));
    assert_eq!(h.contents.fetch_count(), 1);
    assert_eq!(h.tracker.requests().len(), 1);
}

/// Test: negated prose containing the marker still passes the gate
#[tokio::test]
async fn test_substring_gate_is_literal() {
    let h = Harness::new("INFO fine", "No Error found in this log.", OWNERS);

    let outcome = h.runner().run_once().await;

    assert!(matches!(outcome, RunOutcome::Filed(_)));
    assert_eq!(h.tracker.requests()[0].summary, "No Error found in this log.");
}

/// Test: empty manifest stops before filing
#[tokio::test]
async fn test_empty_owner_list_files_nothing() {
    let h = Harness::new("ERROR boom", "Error: boom", "# nobody owns this\n\n");

    let outcome = h.runner().run_once().await;

    assert_eq!(outcome, RunOutcome::NoOwners);
    assert!(h.tracker.requests().is_empty());
}

/// Test: owner fetch failure is treated as no owners
#[tokio::test]
async fn test_owner_fetch_failure_is_no_owners() {
    let h = Harness::with(
        StaticLogSource::new("ERROR boom"),
        ScriptedChat::replying("Error: boom"),
        StaticContents::failing("404 Not Found"),
        RecordingTracker::new(),
    );

    let outcome = h.runner().run_once().await;

    assert_eq!(outcome, RunOutcome::NoOwners);
    assert_eq!(h.contents.fetch_count(), 1);
    assert!(h.tracker.requests().is_empty());
}

/// Test: ticket goes to the first owner, summary is the first reply line
#[tokio::test]
async fn test_ticket_assignee_and_summary() {
    let reply = "Error: connection pool exhausted\nDescription: ...\nDOD: pool sized to peak load";
    let h = Harness::new("ERROR pool", reply, "a @first\nb @second\nc @third\n");

    let outcome = h.runner().run_once().await;

    let record = outcome.ticket().expect("ticket filed").clone();
    assert_eq!(record.key, "OPS-1");

    let filed = h.tracker.requests();
    assert_eq!(filed.len(), 1);
    assert_eq!(filed[0].assignee, "first");
    assert_eq!(filed[0].summary, "Error: connection pool exhausted");
    assert_eq!(filed[0].description, reply);
    assert_eq!(filed[0].project_key, "OPS");
}

/// Test: a custom marker token is honoured
#[tokio::test]
async fn test_configured_marker() {
    let h = Harness::new("ERROR boom", "Error: boom", OWNERS);
    let runner = PipelineRunner::new(
        h.collaborators()
            .with_gate(Arc::new(MarkerGate::new("FAILURE"))),
        PipelineConfig::default(),
    );

    assert_eq!(runner.run_once().await, RunOutcome::NoErrorDetected);
    assert_eq!(h.contents.fetch_count(), 0);
}

/// Test: each stage failure leaves the runner usable for the next run
#[tokio::test]
async fn test_failures_do_not_poison_later_runs() {
    // Read failure
    let h = Harness::with(
        StaticLogSource::failing("permission denied"),
        ScriptedChat::replying("Error"),
        StaticContents::with_file("acme", "shop", "CODEOWNERS", OWNERS),
        RecordingTracker::new(),
    );
    let runner = h.runner();
    let outcome = runner.run_once().await;
    assert!(matches!(
        outcome,
        RunOutcome::Aborted {
            stage: RunStage::Reading,
            error: WatchError::Read { .. }
        }
    ));
    assert!(h.chat.requests().is_empty());
    h.source.set_text("ERROR recovered");
    assert!(matches!(runner.run_once().await, RunOutcome::Filed(_)));

    // Classification failure
    let h = Harness::with(
        StaticLogSource::new("ERROR boom"),
        ScriptedChat::failing("401 invalid api key"),
        StaticContents::with_file("acme", "shop", "CODEOWNERS", OWNERS),
        RecordingTracker::new(),
    );
    let runner = h.runner();
    let outcome = runner.run_once().await;
    assert!(matches!(
        outcome,
        RunOutcome::Aborted {
            stage: RunStage::Classifying,
            ..
        }
    ));
    assert_eq!(h.contents.fetch_count(), 0);
    h.chat.set_reply("Error: boom");
    assert!(matches!(runner.run_once().await, RunOutcome::Filed(_)));

    // Filing failure
    let h = Harness::with(
        StaticLogSource::new("ERROR boom"),
        ScriptedChat::replying("Error: boom"),
        StaticContents::with_file("acme", "shop", "CODEOWNERS", OWNERS),
        RecordingTracker::failing("400 assignee unknown"),
    );
    let runner = h.runner();
    for _ in 0..2 {
        let outcome = runner.run_once().await;
        assert!(matches!(
            outcome,
            RunOutcome::Aborted {
                stage: RunStage::Filing,
                error: WatchError::TicketFiling(_)
            }
        ));
    }
    assert_eq!(h.tracker.requests().len(), 2);
}

/// Test: runs share no state; the same error is ticketed every run by default
#[tokio::test]
async fn test_repeat_runs_file_repeat_tickets_without_dedup() {
    let h = Harness::new("ERROR boom", "Error: boom", OWNERS);
    let runner = h.runner();

    runner.run_once().await;
    runner.run_once().await;

    let assignees: Vec<_> = h.tracker.requests().iter().map(|r| r.assignee.clone()).collect();
    assert_eq!(assignees, ["alice", "alice"]);
    assert_eq!(h.contents.fetch_count(), 2);
}

/// Test: opt-in dedup suppresses the second ticket for unchanged log content
#[tokio::test]
async fn test_dedup_suppresses_same_log_content() {
    let h = Harness::new("ERROR boom", "Error: boom", OWNERS);
    let store = Arc::new(MemoryFingerprintStore::new(chrono::Duration::hours(1)));
    let runner = PipelineRunner::new(
        h.collaborators().with_fingerprints(store.clone()),
        PipelineConfig::default(),
    );

    assert!(matches!(runner.run_once().await, RunOutcome::Filed(_)));
    assert!(matches!(
        runner.run_once().await,
        RunOutcome::Duplicate { .. }
    ));
    assert_eq!(h.tracker.requests().len(), 1);

    h.source.set_text("ERROR boom\nERROR boom again");
    assert!(matches!(runner.run_once().await, RunOutcome::Filed(_)));
    assert_eq!(h.tracker.requests().len(), 2);
    assert_eq!(store.len().await, 2);
}

/// Test: a failed filing is not remembered, so the next run tries again
#[tokio::test]
async fn test_dedup_does_not_record_failed_filings() {
    let h = Harness::with(
        StaticLogSource::new("ERROR boom"),
        ScriptedChat::replying("Error: boom"),
        StaticContents::with_file("acme", "shop", "CODEOWNERS", OWNERS),
        RecordingTracker::failing("503"),
    );
    let store = Arc::new(MemoryFingerprintStore::new(chrono::Duration::hours(1)));
    let runner = PipelineRunner::new(
        h.collaborators().with_fingerprints(store.clone()),
        PipelineConfig::default(),
    );

    runner.run_once().await;
    runner.run_once().await;

    assert_eq!(h.tracker.requests().len(), 2);
    assert_eq!(store.len().await, 0);
}

/// Test: an unusable fingerprint store never blocks filing
#[tokio::test]
async fn test_dedup_store_failure_still_files() {
    let h = Harness::new("ERROR boom", "Error: boom", OWNERS);
    let store = Arc::new(BrokenFingerprintStore::new("state file unreadable"));
    let runner = PipelineRunner::new(
        h.collaborators().with_fingerprints(store.clone()),
        PipelineConfig::default(),
    );

    assert!(matches!(runner.run_once().await, RunOutcome::Filed(_)));
    assert!(matches!(runner.run_once().await, RunOutcome::Filed(_)));

    assert_eq!(h.tracker.requests().len(), 2);
    assert_eq!(store.lookup_count(), 2);
    assert_eq!(store.record_count(), 2);
}

/// Test: a stalled owner fetch is treated like an empty manifest
#[tokio::test(start_paused = true)]
async fn test_owner_fetch_timeout_is_no_owners() {
    let h = Harness::with(
        StaticLogSource::new("ERROR boom"),
        ScriptedChat::replying("Error: boom"),
        StaticContents::with_file("acme", "shop", "CODEOWNERS", OWNERS)
            .with_delay(Duration::from_secs(60)),
        RecordingTracker::new(),
    );
    let runner = PipelineRunner::new(
        h.collaborators(),
        PipelineConfig::default().with_stage_timeout(Duration::from_secs(5)),
    );

    let outcome = runner.run_once().await;

    assert_eq!(outcome, RunOutcome::NoOwners);
    assert_eq!(h.contents.fetch_count(), 1);
    assert!(h.tracker.requests().is_empty());
}

/// Test: a stalled classifier times out and aborts the run
#[tokio::test(start_paused = true)]
async fn test_stage_timeout_aborts_run() {
    let h = Harness::with(
        StaticLogSource::new("ERROR boom"),
        ScriptedChat::replying("Error: boom").with_delay(Duration::from_secs(120)),
        StaticContents::with_file("acme", "shop", "CODEOWNERS", OWNERS),
        RecordingTracker::new(),
    );
    let runner = PipelineRunner::new(
        h.collaborators(),
        PipelineConfig::default().with_stage_timeout(Duration::from_secs(5)),
    );

    let outcome = runner.run_once().await;

    assert_eq!(
        outcome,
        RunOutcome::Aborted {
            stage: RunStage::Classifying,
            error: WatchError::Timeout {
                stage: RunStage::Classifying,
                timeout: Duration::from_secs(5),
            },
        }
    );
    assert_eq!(h.contents.fetch_count(), 0);
}

/// Test: a stalled tracker times out at the filing stage
#[tokio::test(start_paused = true)]
async fn test_filing_timeout_aborts_run() {
    let h = Harness::with(
        StaticLogSource::new("ERROR boom"),
        ScriptedChat::replying("Error: boom"),
        StaticContents::with_file("acme", "shop", "CODEOWNERS", OWNERS),
        RecordingTracker::new().with_delay(Duration::from_secs(60)),
    );
    let runner = PipelineRunner::new(
        h.collaborators(),
        PipelineConfig::default().with_stage_timeout(Duration::from_secs(10)),
    );

    let outcome = runner.run_once().await;

    assert!(matches!(
        outcome,
        RunOutcome::Aborted {
            stage: RunStage::Filing,
            error: WatchError::Timeout { .. }
        }
    ));
}
