//! Opt-in suppression of repeat tickets for the same log content.
//!
//! A `FingerprintStore` remembers when a fingerprint was last ticketed.
//! Entries older than the store's TTL are treated as absent and pruned on
//! write. Two backends:
//! - `MemoryFingerprintStore`: process lifetime only
//! - `JsonFingerprintStore`: survives restarts via a small JSON file

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::Fingerprint;
use crate::error::{Result, WatchError};

/// Recently-filed fingerprints with a time-to-live.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// True if `fingerprint` was recorded less than one TTL before `now`.
    async fn is_recent(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Result<bool>;

    /// Remember that `fingerprint` was ticketed at `now`.
    async fn record(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Result<()>;
}

fn is_live(filed_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(filed_at) < ttl
}

// ---------------------------------------------------------------------------
// MemoryFingerprintStore
// ---------------------------------------------------------------------------

/// In-memory store backed by a `HashMap<Fingerprint, filed_at>`.
#[derive(Debug)]
pub struct MemoryFingerprintStore {
    ttl: Duration,
    entries: Mutex<HashMap<Fingerprint, DateTime<Utc>>>,
}

impl MemoryFingerprintStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl FingerprintStore for MemoryFingerprintStore {
    async fn is_recent(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Result<bool> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(fingerprint)
            .is_some_and(|filed_at| is_live(*filed_at, self.ttl, now)))
    }

    async fn record(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, filed_at| is_live(*filed_at, self.ttl, now));
        entries.insert(fingerprint.clone(), now);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFingerprintStore
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: Vec<StoreEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreEntry {
    fingerprint: Fingerprint,
    filed_at: DateTime<Utc>,
}

const STORE_FILE_VERSION: u32 = 1;

/// File-backed store. The whole set is rewritten atomically on each record.
#[derive(Debug)]
pub struct JsonFingerprintStore {
    path: PathBuf,
    ttl: Duration,
    entries: Mutex<HashMap<Fingerprint, DateTime<Utc>>>,
}

impl JsonFingerprintStore {
    /// Open (or start) the store at `path`. A missing file means an empty store.
    pub async fn open(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file: StoreFile = serde_json::from_slice(&bytes)
                    .map_err(|e| WatchError::Dedup(format!("{}: {e}", path.display())))?;
                file.entries
                    .into_iter()
                    .map(|e| (e.fingerprint, e.filed_at))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(WatchError::Dedup(format!("{}: {e}", path.display()))),
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened fingerprint store");
        Ok(Self {
            path,
            ttl,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn persist(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    // Write to a temp file in the same directory, then rename over the target.
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl FingerprintStore for JsonFingerprintStore {
    async fn is_recent(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Result<bool> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(fingerprint)
            .is_some_and(|filed_at| is_live(*filed_at, self.ttl, now)))
    }

    async fn record(&self, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, filed_at| is_live(*filed_at, self.ttl, now));
        entries.insert(fingerprint.clone(), now);

        let mut file = StoreFile {
            version: STORE_FILE_VERSION,
            entries: entries
                .iter()
                .map(|(fingerprint, filed_at)| StoreEntry {
                    fingerprint: fingerprint.clone(),
                    filed_at: *filed_at,
                })
                .collect(),
        };
        file.entries.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));
        let bytes =
            serde_json::to_vec_pretty(&file).map_err(|e| WatchError::Dedup(e.to_string()))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || persist(&path, &bytes))
            .await
            .map_err(|e| WatchError::Dedup(e.to_string()))?
            .map_err(|e| WatchError::Dedup(format!("{}: {e}", self.path.display())))
    }
}
