//! Wire and domain types exchanged with the agent run.

mod decision;
mod input;
mod interrupt;
mod message;
mod stream;
mod thread;

pub use decision::{Decision, ResumePayload};
pub use input::{InputMessage, Role, RunInput};
pub use interrupt::{AuthorizationHandle, SuspensionRequest};
pub use message::{MessageRecord, ToolCall};
pub use stream::{INTERRUPT_KEY, NodeUpdate, StreamUnit};
pub use thread::ThreadId;
