//! One execution attempt of the run.

use futures::StreamExt;
use tracing::debug;

use super::run::AgentRun;
use crate::Result;
use crate::operator::Operator;
use crate::types::{MessageRecord, RunInput, StreamUnit, SuspensionRequest, ThreadId};

/// What one attempt produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attempt {
    /// Message records, already rendered to the operator.
    pub records: Vec<MessageRecord>,
    /// Suspension requests still waiting for a decision.
    pub interrupts: Vec<SuspensionRequest>,
}

impl Attempt {
    pub fn is_suspended(&self) -> bool {
        !self.interrupts.is_empty()
    }
}

/// Drive the run once and consume its stream to exhaustion.
///
/// Units are handled strictly in arrival order: message records are rendered
/// as soon as their unit arrives and interrupts are accumulated without being
/// rendered. An error from the run aborts the attempt as-is.
pub async fn run_attempt<R, O>(
    run: &R,
    thread: &ThreadId,
    input: RunInput,
    operator: &mut O,
) -> Result<Attempt>
where
    R: AgentRun + ?Sized,
    O: Operator + ?Sized,
{
    let resume = input.is_resume();
    let mut stream = run.stream(thread, input).await?;
    let mut attempt = Attempt::default();

    while let Some(unit) = stream.next().await {
        match unit? {
            StreamUnit::Interrupts(requests) => {
                debug!(thread_id = %thread, count = requests.len(), "Run raised interrupts");
                attempt.interrupts.extend(requests);
            }
            StreamUnit::Updates(updates) => {
                for update in updates {
                    for record in update.messages {
                        operator.render(&record).await?;
                        attempt.records.push(record);
                    }
                }
            }
        }
    }

    debug!(
        thread_id = %thread,
        resume,
        records = attempt.records.len(),
        interrupts = attempt.interrupts.len(),
        "Attempt finished"
    );
    Ok(attempt)
}
