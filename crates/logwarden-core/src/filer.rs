//! Ticket filing against an issue tracker.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collaborators::IssueTracker;
use crate::domain::ticket::DEFAULT_ISSUE_TYPE;
use crate::domain::{ErrorAssessment, OwnerManifest, TicketRecord, TicketRequest};
use crate::error::{Result, WatchError};

/// Fixed fields of every ticket we file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDefaults {
    pub project_key: String,
    pub issue_type: String,
}

impl TicketDefaults {
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            issue_type: DEFAULT_ISSUE_TYPE.to_string(),
        }
    }

    pub fn with_issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue_type = issue_type.into();
        self
    }
}

/// Builds one `TicketRequest` per call and submits it. No retry.
pub struct TicketFiler {
    tracker: Arc<dyn IssueTracker>,
    defaults: TicketDefaults,
}

impl TicketFiler {
    pub fn new(tracker: Arc<dyn IssueTracker>, defaults: TicketDefaults) -> Self {
        Self { tracker, defaults }
    }

    pub fn defaults(&self) -> &TicketDefaults {
        &self.defaults
    }

    /// The request `file` would submit.
    pub fn build_request(
        &self,
        assessment: &ErrorAssessment,
        owners: &OwnerManifest,
    ) -> Result<TicketRequest> {
        TicketRequest::from_assessment(
            &self.defaults.project_key,
            &self.defaults.issue_type,
            assessment,
            owners,
        )
        .ok_or_else(|| WatchError::TicketFiling("no assignee available".to_string()))
    }

    /// Assigns to the first owner; the handle is not checked against the tracker.
    pub async fn file(
        &self,
        assessment: &ErrorAssessment,
        owners: &OwnerManifest,
    ) -> Result<TicketRecord> {
        let request = self.build_request(assessment, owners)?;
        self.tracker.create_issue(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::RecordingTracker;

    #[tokio::test]
    async fn test_files_one_ticket_for_first_owner() {
        let tracker = Arc::new(RecordingTracker::new());
        let filer = TicketFiler::new(tracker.clone(), TicketDefaults::new("OPS"));

        let record = filer
            .file(
                &ErrorAssessment::new("Error: cache miss storm\nDOD: warm cache"),
                &OwnerManifest::from_owners(["alice", "bob"]),
            )
            .await
            .unwrap();

        assert_eq!(record.key, "OPS-1");
        let filed = tracker.requests();
        assert_eq!(filed.len(), 1);
        assert_eq!(filed[0].assignee, "alice");
        assert_eq!(filed[0].summary, "Error: cache miss storm");
        assert_eq!(filed[0].issue_type, "Task");
    }

    #[tokio::test]
    async fn test_empty_manifest_never_reaches_tracker() {
        let tracker = Arc::new(RecordingTracker::new());
        let filer = TicketFiler::new(
            tracker.clone(),
            TicketDefaults::new("OPS").with_issue_type("Bug"),
        );

        let err = filer
            .file(&ErrorAssessment::new("Error"), &OwnerManifest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, WatchError::TicketFiling(_)));
        assert!(tracker.requests().is_empty());
    }
}
