//! Log snapshot captured at the start of a run.

use super::Fingerprint;

/// Full text of the monitored log at one read. No structure is imposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSnapshot {
    source: String,
    text: String,
}

impl LogSnapshot {
    /// Create a snapshot of `text` read from `source` (a path or label).
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// Where this text was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True for a zero-length read. Whitespace still counts as content.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Content fingerprint of the log text (source excluded).
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self.text.as_bytes())
    }
}
