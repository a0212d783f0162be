//! The agent run consumed by the turn controller.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::Result;
use crate::types::{RunInput, StreamUnit, ThreadId};

/// Units of one execution attempt, in emission order.
pub type UnitStream = Pin<Box<dyn Stream<Item = Result<StreamUnit>> + Send>>;

/// A resumable, checkpointed agent run.
///
/// Invoking it again on the same thread with [`RunInput::Resume`] must continue
/// exactly where the previous attempt paused. The stream ends when the run
/// either finishes or pauses awaiting a resume.
#[async_trait]
pub trait AgentRun: Send + Sync {
    async fn stream(&self, thread: &ThreadId, input: RunInput) -> Result<UnitStream>;
}
