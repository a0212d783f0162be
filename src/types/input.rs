//! Inputs accepted by one invocation of the agent run.

use serde::{Deserialize, Serialize};

use super::ResumePayload;

/// Role of a submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A message submitted to the run as fresh input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: String,
}

impl InputMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Either a fresh user message or the decisions resuming a paused run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunInput {
    Messages(Vec<InputMessage>),
    Resume(ResumePayload),
}

impl RunInput {
    pub fn user(content: impl Into<String>) -> Self {
        Self::Messages(vec![InputMessage::user(content)])
    }

    pub fn is_resume(&self) -> bool {
        matches!(self, Self::Resume(_))
    }
}
