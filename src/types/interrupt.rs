//! Suspension requests raised by a paused run.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A signal from the run that it cannot continue without external input.
///
/// The payload is kept exactly as the run emitted it; routing happens once,
/// in [`crate::agent::classify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspensionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl SuspensionRequest {
    pub fn new(value: Value) -> Self {
        Self { id: None, value }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Payload asking the operator to finish an authorization flow in a browser.
    pub fn authorization(
        tool_name: impl Into<String>,
        authorization_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::new(json!({
            "authorization_required": true,
            "tool_name": tool_name.into(),
            "authorization_response": {
                "id": authorization_id.into(),
                "url": url.into(),
            },
        }))
    }

    /// Payload asking the operator to approve a tool call.
    pub fn human_approval(tool_name: impl Into<String>, input: Value) -> Self {
        Self::new(json!({
            "hitl_required": true,
            "tool_name": tool_name.into(),
            "input": input,
        }))
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.field("tool_name").and_then(Value::as_str)
    }
}

/// Handle issued with an authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationHandle {
    pub id: String,
    #[serde(default)]
    pub url: String,
}
