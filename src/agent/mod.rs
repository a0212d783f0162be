//! Turn execution: streaming a run, suspending on interrupts, resuming.

mod classify;
mod consumer;
mod resolver;
mod run;
mod turn;

#[cfg(test)]
pub(crate) mod tests;

pub use classify::{InterruptFlow, classify};
pub use consumer::{Attempt, run_attempt};
pub use resolver::{AuthorizationChannel, DecisionResolver};
pub use run::{AgentRun, UnitStream};
pub use turn::{TurnController, TurnReport};
