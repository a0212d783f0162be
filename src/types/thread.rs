//! Conversation thread identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key correlating every run and resume of one conversation.
///
/// The checkpoint store behind the agent run owns the thread's history; this
/// crate only threads the identifier through each invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ThreadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(ThreadId::random(), ThreadId::random());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = ThreadId::from("1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1\"");
        assert_eq!(id.to_string(), "1");
    }
}
