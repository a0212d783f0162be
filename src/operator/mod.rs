//! Operator I/O: rendering run output, notices, and reading answers.

mod console;

pub use console::Console;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::types::MessageRecord;

/// Out-of-band messages shown to the operator while a turn is driven.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Welcome,
    Farewell,
    AuthorizationRequired { tool_name: String, url: String },
    AwaitingAuthorization,
    AuthorizationGranted,
    AuthorizationFailed { error: String },
    ApprovalRequired { tool_name: String, input: Value },
    TurnFailed { error: String },
}

/// The human at the terminal.
///
/// Every method is a suspension point of the session: nothing else runs while
/// the operator is being asked or shown something.
#[async_trait]
pub trait Operator: Send {
    /// Show `prompt` and read one line; `None` once input is exhausted.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Render one message record produced by the run.
    async fn render(&mut self, record: &MessageRecord) -> Result<()>;

    async fn notify(&mut self, notice: Notice) -> Result<()>;

    /// Ask a yes/no question; anything but an affirmative answer is a no.
    async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{} (y/n) ", question)).await?;
        Ok(answer.as_deref().is_some_and(is_affirmative))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
