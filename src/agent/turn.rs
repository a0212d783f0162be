//! Turn controller: run, suspend, resolve, resume, until no interrupts remain.

use std::sync::Arc;

use tracing::{debug, info};

use super::classify::classify;
use super::consumer::run_attempt;
use super::resolver::DecisionResolver;
use super::run::AgentRun;
use crate::operator::Operator;
use crate::types::{Decision, ResumePayload, RunInput, SuspensionRequest, ThreadId};
use crate::{Error, Result};

/// Summary of a completed turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReport {
    /// Execution attempts, the first one included.
    pub attempts: usize,
    /// Message records rendered across all attempts.
    pub records: usize,
    /// Every resume payload sent, in order.
    pub resumes: Vec<ResumePayload>,
}

enum TurnPhase {
    Running(RunInput),
    Suspended(Vec<SuspensionRequest>),
    Resolving {
        pending: std::vec::IntoIter<SuspensionRequest>,
        decisions: Vec<Decision>,
    },
    Resuming(Vec<Decision>),
    Completed,
}

impl TurnPhase {
    fn name(&self) -> &'static str {
        match self {
            Self::Running(_) => "running",
            Self::Suspended(_) => "suspended",
            Self::Resolving { .. } => "resolving",
            Self::Resuming(_) => "resuming",
            Self::Completed => "completed",
        }
    }
}

/// Drives one user message to completion against a resumable run.
#[derive(Clone)]
pub struct TurnController {
    run: Arc<dyn AgentRun>,
    resolver: DecisionResolver,
    max_resumes: Option<usize>,
}

impl TurnController {
    pub fn new(run: Arc<dyn AgentRun>, resolver: DecisionResolver) -> Self {
        Self {
            run,
            resolver,
            max_resumes: None,
        }
    }

    /// Fail the turn instead of resuming more than `limit` times.
    pub fn with_max_resumes(mut self, limit: Option<usize>) -> Self {
        self.max_resumes = limit;
        self
    }

    /// Run `message` on `thread` until an attempt raises no interrupts.
    ///
    /// Every interrupt of an attempt is resolved, in order, before the run is
    /// resumed on the same thread. An error from the run aborts the turn
    /// immediately and nothing further is resolved.
    pub async fn run_turn<O>(
        &self,
        thread: &ThreadId,
        message: &str,
        operator: &mut O,
    ) -> Result<TurnReport>
    where
        O: Operator + ?Sized,
    {
        let mut report = TurnReport::default();
        let mut phase = TurnPhase::Running(RunInput::user(message));

        loop {
            debug!(thread_id = %thread, phase = phase.name(), "Turn transition");
            phase = match phase {
                TurnPhase::Running(input) => {
                    report.attempts += 1;
                    let attempt = run_attempt(self.run.as_ref(), thread, input, operator).await?;
                    report.records += attempt.records.len();
                    if attempt.is_suspended() {
                        TurnPhase::Suspended(attempt.interrupts)
                    } else {
                        TurnPhase::Completed
                    }
                }
                TurnPhase::Suspended(requests) => {
                    if let Some(limit) = self.max_resumes
                        && report.resumes.len() >= limit
                    {
                        return Err(Error::TurnLimit { limit });
                    }
                    info!(thread_id = %thread, interrupts = requests.len(), "Run suspended");
                    TurnPhase::Resolving {
                        decisions: Vec::with_capacity(requests.len()),
                        pending: requests.into_iter(),
                    }
                }
                TurnPhase::Resolving {
                    mut pending,
                    mut decisions,
                } => match pending.next() {
                    Some(request) => {
                        let decision = self.resolver.resolve(classify(&request), operator).await?;
                        decisions.push(decision);
                        TurnPhase::Resolving { pending, decisions }
                    }
                    None => TurnPhase::Resuming(decisions),
                },
                TurnPhase::Resuming(decisions) => {
                    let payload = ResumePayload::from_decisions(decisions);
                    report.resumes.push(payload.clone());
                    TurnPhase::Running(RunInput::Resume(payload))
                }
                TurnPhase::Completed => {
                    info!(
                        thread_id = %thread,
                        attempts = report.attempts,
                        resumes = report.resumes.len(),
                        "Turn completed"
                    );
                    return Ok(report);
                }
            };
        }
    }
}
