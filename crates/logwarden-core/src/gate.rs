//! Error gate: decides whether a classifier reply should go on to ticketing.

use crate::domain::ErrorAssessment;

/// Marker token used when none is configured.
pub const DEFAULT_ERROR_MARKER: &str = "Error";

/// Predicate over a classifier reply.
///
/// Kept separate from the classifier so a structured verdict can replace
/// the substring test without touching the pipeline.
pub trait ErrorGate: Send + Sync {
    fn indicates_error(&self, assessment: &ErrorAssessment) -> bool;
}

/// Literal, case-sensitive substring test.
///
/// Prose such as "No Error found" passes this gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerGate {
    marker: String,
}

impl MarkerGate {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Default for MarkerGate {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_MARKER)
    }
}

impl ErrorGate for MarkerGate {
    fn indicates_error(&self, assessment: &ErrorAssessment) -> bool {
        assessment.text().contains(self.marker.as_str())
    }
}

impl<F> ErrorGate for F
where
    F: Fn(&ErrorAssessment) -> bool + Send + Sync,
{
    fn indicates_error(&self, assessment: &ErrorAssessment) -> bool {
        self(assessment)
    }
}
