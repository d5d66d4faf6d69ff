//! Integration tests for the scheduler's single-flight run lock.

use std::sync::Arc;
use std::time::Duration;

use logwarden_core::fakes::{RecordingTracker, ScriptedChat, StaticContents, StaticLogSource};
use logwarden_core::{
    ClassifierConfig, Collaborators, ErrorClassifier, ManifestLocation, OwnerResolver,
    PipelineConfig, PipelineRunner, RunOutcome, Scheduler, TicketDefaults, TicketFiler,
};

fn slow_runner(
    classify_delay: Duration,
) -> (Arc<PipelineRunner>, Arc<ScriptedChat>, Arc<RecordingTracker>) {
    let chat = Arc::new(ScriptedChat::replying("Error: boom").with_delay(classify_delay));
    let tracker = Arc::new(RecordingTracker::new());
    let collaborators = Collaborators::new(
        Arc::new(StaticLogSource::new("ERROR boom")),
        ErrorClassifier::new(chat.clone(), ClassifierConfig::default()),
        OwnerResolver::new(
            Arc::new(StaticContents::with_file("acme", "shop", "CODEOWNERS", "* @alice\n")),
            ManifestLocation::new("acme", "shop"),
        ),
        TicketFiler::new(tracker.clone(), TicketDefaults::new("OPS")),
    );
    let runner = Arc::new(PipelineRunner::new(collaborators, PipelineConfig::default()));
    (runner, chat, tracker)
}

/// Test: a trigger while a run is in flight is rejected
#[tokio::test(start_paused = true)]
async fn test_overlapping_trigger_is_skipped() {
    let (runner, chat, tracker) = slow_runner(Duration::from_secs(20));
    let scheduler = Scheduler::new(runner, Duration::from_secs(10));

    let first = scheduler.try_trigger().expect("first run starts");
    assert!(scheduler.is_running());
    assert!(scheduler.try_trigger().is_none());
    assert!(scheduler.try_trigger().is_none());

    let outcome = first.await.expect("run task");
    assert!(matches!(outcome, RunOutcome::Filed(_)));
    assert!(!scheduler.is_running());
    assert_eq!(chat.requests().len(), 1);
    assert_eq!(tracker.requests().len(), 1);

    let second = scheduler.try_trigger().expect("lock released after run");
    assert!(matches!(second.await.expect("run task"), RunOutcome::Filed(_)));
    assert_eq!(tracker.requests().len(), 2);
}

/// Test: ticking faster than runs complete never overlaps runs
#[tokio::test(start_paused = true)]
async fn test_run_loop_drops_ticks_during_slow_runs() {
    // Runs take 3.5s; ticks every 1s. Runs start at t=0, 4, 8.
    let (runner, chat, tracker) = slow_runner(Duration::from_millis(3500));
    let scheduler = Scheduler::new(runner, Duration::from_secs(1));

    scheduler
        .run_until(tokio::time::sleep(Duration::from_secs(10)))
        .await;

    assert_eq!(chat.requests().len(), 3);
    // The run in flight at shutdown was drained, not abandoned.
    assert_eq!(tracker.requests().len(), 3);
    assert!(!scheduler.is_running());
}

/// Test: shutdown waits for the run started by the first tick
#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_in_flight_run() {
    let (runner, _chat, tracker) = slow_runner(Duration::from_secs(5));
    let scheduler = Scheduler::new(runner, Duration::from_secs(60));

    let started = tokio::time::Instant::now();
    scheduler
        .run_until(tokio::time::sleep(Duration::from_secs(1)))
        .await;

    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(tracker.requests().len(), 1);
}
