//! Interactive session: one thread, many turns, until the operator leaves.

use tracing::{debug, info, warn};

use crate::Result;
use crate::agent::TurnController;
use crate::operator::{Notice, Operator};
use crate::types::ThreadId;

pub const EXIT_KEYWORD: &str = "exit";
pub const PROMPT: &str = "> ";

/// Exact, case-insensitive match; padded input is an ordinary message.
pub fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case(EXIT_KEYWORD)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: usize,
    pub failed_turns: usize,
}

/// Drives turns on a single conversation thread.
pub struct Session {
    controller: TurnController,
    thread: ThreadId,
}

impl Session {
    pub fn new(controller: TurnController, thread: ThreadId) -> Self {
        Self { controller, thread }
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread
    }

    /// Read messages until `exit` or end of input. A failed turn is reported
    /// to the operator and the session keeps going on the same thread.
    pub async fn run<O>(&self, operator: &mut O) -> Result<SessionSummary>
    where
        O: Operator + ?Sized,
    {
        let mut summary = SessionSummary::default();
        info!(thread_id = %self.thread, "Session started");
        operator.notify(Notice::Welcome).await?;

        while let Some(line) = operator.read_line(PROMPT).await? {
            if is_exit(&line) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            summary.turns += 1;
            match self.controller.run_turn(&self.thread, &line, operator).await {
                Ok(report) => {
                    debug!(
                        thread_id = %self.thread,
                        attempts = report.attempts,
                        records = report.records,
                        "Turn completed"
                    );
                }
                Err(e) => {
                    summary.failed_turns += 1;
                    warn!(thread_id = %self.thread, error = %e, "Turn failed");
                    operator
                        .notify(Notice::TurnFailed {
                            error: e.to_string(),
                        })
                        .await?;
                }
            }
        }

        operator.notify(Notice::Farewell).await?;
        info!(thread_id = %self.thread, turns = summary.turns, "Session ended");
        Ok(summary)
    }
}
