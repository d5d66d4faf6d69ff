//! Classifier verdict for one snapshot.

/// The language model's free-text reply for one `LogSnapshot`.
///
/// Whether it "looks like an error" is decided by an
/// [`ErrorGate`](crate::gate::ErrorGate), not by this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorAssessment {
    text: String,
}

impl ErrorAssessment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Verbatim reply text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text up to the first newline, without a trailing carriage return.
    pub fn first_line(&self) -> &str {
        let line = self.text.split('\n').next().unwrap_or_default();
        line.strip_suffix('\r').unwrap_or(line)
    }
}
