//! Ticket request and tracker response.

use serde::{Deserialize, Serialize};

use super::{ErrorAssessment, OwnerManifest};

/// Issue type used when none is configured.
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

/// Everything the tracker needs to create one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Tracker project key.
    pub project_key: String,

    /// First line of the assessment.
    pub summary: String,

    /// Full assessment text.
    pub description: String,

    /// Issue type name (e.g. "Task").
    pub issue_type: String,

    /// First owner from the manifest.
    pub assignee: String,
}

impl TicketRequest {
    /// Build a request from an assessment and its owners.
    ///
    /// Returns `None` when the manifest is empty.
    pub fn from_assessment(
        project_key: &str,
        issue_type: &str,
        assessment: &ErrorAssessment,
        owners: &OwnerManifest,
    ) -> Option<Self> {
        let assignee = owners.primary()?;
        Some(Self {
            project_key: project_key.to_string(),
            summary: assessment.first_line().to_string(),
            description: assessment.text().to_string(),
            issue_type: issue_type.to_string(),
            assignee: assignee.to_string(),
        })
    }
}

/// Tracker's answer to a create-issue call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Human-facing key, e.g. `OPS-42`.
    pub key: String,

    /// Tracker-internal id, when returned.
    pub id: Option<String>,

    /// API link to the created issue, when returned.
    pub url: Option<String>,
}

impl TicketRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: None,
            url: None,
        }
    }
}
