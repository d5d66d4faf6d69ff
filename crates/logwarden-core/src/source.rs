//! File-backed log source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::collaborators::LogSource;
use crate::domain::LogSnapshot;
use crate::error::{Result, WatchError};

/// Reads the whole log file as UTF-8 on every call.
#[derive(Debug, Clone)]
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSource for FileLogSource {
    async fn read(&self) -> Result<LogSnapshot> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| WatchError::Read {
                source_name: self.describe(),
                reason: e.to_string(),
            })?;
        debug!(path = %self.path.display(), bytes = text.len(), "Read log file");
        Ok(LogSnapshot::new(self.describe(), text))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
