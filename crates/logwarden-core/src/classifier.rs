//! LLM-backed error classification.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collaborators::{ChatCompletion, ChatRequest};
use crate::domain::{ErrorAssessment, LogSnapshot};
use crate::error::{Result, WatchError};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// System instruction used when none is configured.
pub const DEFAULT_INSTRUCTION: &str = "You are an expert at analyzing log files and identifying errors. \
Analyze the following log content and identify if there are any errors. \
If there are errors, provide a brief description and suggest a Definition of Done (DOD) for fixing it.";

/// Model and prompt for the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub model: String,
    pub instruction: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

impl ClassifierConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }
}

/// Sends one snapshot per call to a chat model and returns the reply verbatim.
pub struct ErrorClassifier {
    chat: Arc<dyn ChatCompletion>,
    config: ClassifierConfig,
}

impl ErrorClassifier {
    pub fn new(chat: Arc<dyn ChatCompletion>, config: ClassifierConfig) -> Self {
        Self { chat, config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Exactly one chat exchange; no state is kept between calls.
    pub async fn classify(&self, snapshot: &LogSnapshot) -> Result<ErrorAssessment> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            system: self.config.instruction.clone(),
            user: snapshot.text().to_string(),
        };

        let reply = self.chat.complete(request).await?;
        if reply.trim().is_empty() {
            return Err(WatchError::Classification(
                "model returned an empty reply".to_string(),
            ));
        }

        debug!(model = %self.config.model, reply_len = reply.len(), "Classifier replied");
        Ok(ErrorAssessment::new(reply))
    }
}
