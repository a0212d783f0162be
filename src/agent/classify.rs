//! Routing of suspension requests to a resolution path.

use serde_json::Value;

use crate::types::{AuthorizationHandle, SuspensionRequest};

const AUTHORIZATION_FLAG: &str = "authorization_required";
const HUMAN_APPROVAL_FLAG: &str = "hitl_required";
const UNKNOWN_TOOL: &str = "unknown";

/// Resolution path for one suspension request.
#[derive(Debug, Clone, PartialEq)]
pub enum InterruptFlow {
    /// The tool needs credentials the operator grants in a browser.
    Authorization {
        tool_name: String,
        handle: AuthorizationHandle,
    },
    /// The tool call needs an explicit yes from the operator.
    HumanApproval { tool_name: String, input: Value },
    /// Nothing recognizable; always resolved as not authorized.
    Unclassified,
}

/// Authorization wins over human approval when both flags are set. An
/// authorization flag without a usable handle cannot be waited on and is
/// left unclassified.
pub fn classify(request: &SuspensionRequest) -> InterruptFlow {
    let tool_name = || {
        request
            .tool_name()
            .unwrap_or(UNKNOWN_TOOL)
            .to_string()
    };

    if is_truthy(request.field(AUTHORIZATION_FLAG)) {
        return match request
            .field("authorization_response")
            .cloned()
            .map(serde_json::from_value::<AuthorizationHandle>)
        {
            Some(Ok(handle)) if !handle.id.is_empty() => InterruptFlow::Authorization {
                tool_name: tool_name(),
                handle,
            },
            _ => InterruptFlow::Unclassified,
        };
    }

    if is_truthy(request.field(HUMAN_APPROVAL_FLAG)) {
        return InterruptFlow::HumanApproval {
            tool_name: tool_name(),
            input: request.field("input").cloned().unwrap_or(Value::Null),
        };
    }

    InterruptFlow::Unclassified
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
