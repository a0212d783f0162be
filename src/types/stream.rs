//! Units of the run's `updates` stream.

use serde_json::Value;

use super::{MessageRecord, SuspensionRequest};
use crate::{Error, Result};

/// Key under which the run reports interrupts instead of node output.
pub const INTERRUPT_KEY: &str = "__interrupt__";

/// One emitted unit: either suspension requests or per-node updates.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUnit {
    Interrupts(Vec<SuspensionRequest>),
    Updates(Vec<NodeUpdate>),
}

/// Messages written by one producer (graph node) in a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUpdate {
    pub producer: String,
    pub messages: Vec<MessageRecord>,
}

impl NodeUpdate {
    pub fn new(producer: impl Into<String>, messages: Vec<MessageRecord>) -> Self {
        Self {
            producer: producer.into(),
            messages,
        }
    }
}

impl StreamUnit {
    /// Convenience for a unit carrying one producer's messages.
    pub fn messages(producer: impl Into<String>, messages: Vec<MessageRecord>) -> Self {
        Self::Updates(vec![NodeUpdate::new(producer, messages)])
    }

    /// Decode a unit from its JSON form.
    ///
    /// `{"__interrupt__": [...]}` yields the interrupts; a null `__interrupt__`
    /// is ignored. Any other object maps
    /// producer names to updates; producers without a `messages` field, and
    /// non-object units, contribute nothing.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Ok(Self::Updates(Vec::new()));
        };

        // A null interrupt field is absent; the producers beside it still count.
        match map.remove(INTERRUPT_KEY) {
            None | Some(Value::Null) => {}
            Some(interrupts @ Value::Array(_)) => {
                return Ok(Self::Interrupts(serde_json::from_value(interrupts)?));
            }
            Some(single) => return Ok(Self::Interrupts(vec![serde_json::from_value(single)?])),
        }

        let mut updates = Vec::with_capacity(map.len());
        for (producer, update) in map {
            let messages = match update {
                Value::Object(mut fields) => match fields.remove("messages") {
                    Some(Value::Array(items)) => items
                        .into_iter()
                        .map(serde_json::from_value)
                        .collect::<std::result::Result<Vec<MessageRecord>, _>>()?,
                    Some(single @ Value::Object(_)) => vec![serde_json::from_value(single)?],
                    Some(Value::Null) | None => Vec::new(),
                    Some(other) => {
                        return Err(Error::Stream(format!(
                            "unexpected messages field from {}: {}",
                            producer, other
                        )));
                    }
                },
                _ => Vec::new(),
            };
            updates.push(NodeUpdate { producer, messages });
        }
        Ok(Self::Updates(updates))
    }

    pub fn interrupt_count(&self) -> usize {
        match self {
            Self::Interrupts(requests) => requests.len(),
            Self::Updates(_) => 0,
        }
    }
}
