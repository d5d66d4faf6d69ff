//! Periodic trigger with a single-flight run lock.
//!
//! Ticks arrive on a fixed cadence. A tick starts a run only if no other run
//! holds the lock; otherwise it is dropped (not queued).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::domain::RunOutcome;
use crate::obs;
use crate::pipeline::PipelineRunner;

/// Tick cadence used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct Scheduler {
    runner: Arc<PipelineRunner>,
    interval: Duration,
    run_lock: Arc<Semaphore>,
}

impl Scheduler {
    pub fn new(runner: Arc<PipelineRunner>, interval: Duration) -> Self {
        Self {
            runner,
            interval: interval.max(MIN_INTERVAL),
            run_lock: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True while a run holds the lock.
    pub fn is_running(&self) -> bool {
        self.run_lock.available_permits() == 0
    }

    /// Start a run unless one is in flight.
    ///
    /// The lock is taken before this returns, so a second call made before
    /// the spawned run finishes always returns `None`.
    pub fn try_trigger(&self) -> Option<JoinHandle<RunOutcome>> {
        let Ok(permit) = self.run_lock.clone().try_acquire_owned() else {
            obs::emit_run_skipped();
            return None;
        };

        let runner = Arc::clone(&self.runner);
        Some(tokio::spawn(async move {
            let outcome = runner.run_once().await;
            drop(permit);
            outcome
        }))
    }

    /// Tick until `shutdown` resolves, then wait for any in-flight run.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(interval_ms = self.interval.as_millis() as u64, "Scheduler started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let _ = self.try_trigger();
                }
            }
        }

        if self.is_running() {
            info!("Shutdown requested, waiting for in-flight run");
        }
        let _drained = self.run_lock.acquire().await;
        info!("Scheduler stopped");
    }
}

