//! In-memory fakes for the collaborator traits (testing only)
//!
//! Provides `StaticLogSource`, `ScriptedChat`, `StaticContents`,
//! `RecordingTracker` and `BrokenFingerprintStore`. Each records how it was called so tests can assert
//! on call counts and payloads, and each can be told to fail or stall.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::collaborators::{ChatCompletion, ChatRequest, IssueTracker, LogSource, RepositoryContents};
use crate::dedup::FingerprintStore;
use crate::domain::{Fingerprint, LogSnapshot, TicketRecord, TicketRequest};
use crate::error::{Result, WatchError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn stall(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

// ---------------------------------------------------------------------------
// StaticLogSource
// ---------------------------------------------------------------------------

/// Log source returning fixed text (or a fixed failure).
#[derive(Debug)]
pub struct StaticLogSource {
    text: Mutex<std::result::Result<String, String>>,
    reads: Mutex<usize>,
    delay: Option<Duration>,
}

impl StaticLogSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Ok(text.into())),
            reads: Mutex::new(0),
            delay: None,
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Err(reason.into())),
            reads: Mutex::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the content returned by later reads.
    pub fn set_text(&self, text: impl Into<String>) {
        *lock(&self.text) = Ok(text.into());
    }

    pub fn read_count(&self) -> usize {
        *lock(&self.reads)
    }
}

#[async_trait]
impl LogSource for StaticLogSource {
    async fn read(&self) -> Result<LogSnapshot> {
        *lock(&self.reads) += 1;
        stall(self.delay).await;
        let text = lock(&self.text).clone();
        text.map(|t| LogSnapshot::new(self.describe(), t))
            .map_err(|reason| WatchError::Read {
                source_name: self.describe(),
                reason,
            })
    }

    fn describe(&self) -> String {
        "static.log".to_string()
    }
}

// ---------------------------------------------------------------------------
// ScriptedChat
// ---------------------------------------------------------------------------

/// Chat model that always gives the same reply (or failure).
#[derive(Debug)]
pub struct ScriptedChat {
    reply: Mutex<std::result::Result<String, String>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
}

impl ScriptedChat {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(Ok(reply.into())),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(Err(reason.into())),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_reply(&self, reply: impl Into<String>) {
        *lock(&self.reply) = Ok(reply.into());
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        lock(&self.requests).push(request);
        stall(self.delay).await;
        lock(&self.reply).clone().map_err(WatchError::Classification)
    }
}

// ---------------------------------------------------------------------------
// StaticContents
// ---------------------------------------------------------------------------

/// Repository contents keyed by `owner/repo:path`.
#[derive(Debug, Default)]
pub struct StaticContents {
    files: Mutex<HashMap<String, String>>,
    failure: Option<String>,
    fetches: Mutex<usize>,
    delay: Option<Duration>,
}

fn file_key(owner: &str, repo: &str, path: &str) -> String {
    format!("{owner}/{repo}:{path}")
}

impl StaticContents {
    pub fn with_file(owner: &str, repo: &str, path: &str, text: impl Into<String>) -> Self {
        let contents = Self::default();
        contents.put(owner, repo, path, text);
        contents
    }

    /// Every fetch fails with `OwnerFetch(reason)`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn put(&self, owner: &str, repo: &str, path: &str, text: impl Into<String>) {
        lock(&self.files).insert(file_key(owner, repo, path), text.into());
    }

    pub fn fetch_count(&self) -> usize {
        *lock(&self.fetches)
    }
}

#[async_trait]
impl RepositoryContents for StaticContents {
    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> Result<String> {
        *lock(&self.fetches) += 1;
        stall(self.delay).await;
        if let Some(reason) = &self.failure {
            return Err(WatchError::OwnerFetch(reason.clone()));
        }
        let key = file_key(owner, repo, path);
        lock(&self.files)
            .get(&key)
            .cloned()
            .ok_or_else(|| WatchError::OwnerFetch(format!("{key} not found")))
    }
}

// ---------------------------------------------------------------------------
// RecordingTracker
// ---------------------------------------------------------------------------

/// Issue tracker that records every request and hands out `PROJECT-n` keys.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    requests: Mutex<Vec<TicketRequest>>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every create call fails with `TicketFiling(reason)` (still recorded).
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<TicketRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl IssueTracker for RecordingTracker {
    async fn create_issue(&self, request: &TicketRequest) -> Result<TicketRecord> {
        let n = {
            let mut requests = lock(&self.requests);
            requests.push(request.clone());
            requests.len()
        };
        stall(self.delay).await;
        if let Some(reason) = &self.failure {
            return Err(WatchError::TicketFiling(reason.clone()));
        }
        Ok(TicketRecord {
            key: format!("{}-{n}", request.project_key),
            id: Some(n.to_string()),
            url: None,
        })
    }
}

// ---------------------------------------------------------------------------
// BrokenFingerprintStore
// ---------------------------------------------------------------------------

/// Fingerprint store whose every call fails with `Dedup(reason)`.
#[derive(Debug)]
pub struct BrokenFingerprintStore {
    reason: String,
    lookups: Mutex<usize>,
    records: Mutex<usize>,
}

impl BrokenFingerprintStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            lookups: Mutex::new(0),
            records: Mutex::new(0),
        }
    }

    pub fn lookup_count(&self) -> usize {
        *lock(&self.lookups)
    }

    pub fn record_count(&self) -> usize {
        *lock(&self.records)
    }
}

#[async_trait]
impl FingerprintStore for BrokenFingerprintStore {
    async fn is_recent(&self, _fingerprint: &Fingerprint, _now: DateTime<Utc>) -> Result<bool> {
        *lock(&self.lookups) += 1;
        Err(WatchError::Dedup(self.reason.clone()))
    }

    async fn record(&self, _fingerprint: &Fingerprint, _now: DateTime<Utc>) -> Result<()> {
        *lock(&self.records) += 1;
        Err(WatchError::Dedup(self.reason.clone()))
    }
}
