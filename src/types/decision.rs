//! Decisions and the resume payload built from them.

use serde::{Deserialize, Serialize};

/// Outcome of resolving one suspension request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub authorized: bool,
}

impl Decision {
    pub fn approve() -> Self {
        Self { authorized: true }
    }

    pub fn deny() -> Self {
        Self { authorized: false }
    }
}

impl From<bool> for Decision {
    fn from(authorized: bool) -> Self {
        Self { authorized }
    }
}

/// Decisions from one resolution pass, in the order the requests were raised.
///
/// The run correlates decisions positionally and distinguishes a single resume
/// value from a batch, so a pass with exactly one pending request sends the
/// bare decision and every other pass sends the ordered array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumePayload {
    Single(Decision),
    Batch(Vec<Decision>),
}

impl ResumePayload {
    pub fn from_decisions(mut decisions: Vec<Decision>) -> Self {
        if decisions.len() == 1 {
            if let Some(decision) = decisions.pop() {
                return Self::Single(decision);
            }
        }
        Self::Batch(decisions)
    }

    pub fn decisions(&self) -> &[Decision] {
        match self {
            Self::Single(decision) => std::slice::from_ref(decision),
            Self::Batch(decisions) => decisions,
        }
    }

    pub fn len(&self) -> usize {
        self.decisions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions().is_empty()
    }
}
