//! Message records emitted by the run's nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const BANNER_WIDTH: usize = 80;

/// A chat message as serialized by the run (`ai`, `human`, `tool`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A tool invocation requested by an AI message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MessageRecord {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: Value::String(content.into()),
            name: None,
            id: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new("ai", content)
    }

    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new("tool", content)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }

    /// Plain text of the message; list content keeps only its text parts.
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Human-readable form: a titled banner, the optional name, the text and
    /// any requested tool calls with their arguments.
    pub fn formatted(&self) -> String {
        let mut out = banner(&format!("{} Message", title_case(&self.kind)));
        if let Some(name) = &self.name {
            out.push_str("\nName: ");
            out.push_str(name);
        }
        out.push_str("\n\n");
        out.push_str(&self.text());

        if !self.tool_calls.is_empty() {
            out.push_str("\nTool Calls:");
            for call in &self.tool_calls {
                let id = call.id.as_deref().unwrap_or_default();
                out.push_str(&format!("\n  {} ({})\n Call ID: {}\n  Args:", call.name, id, id));
                if let Value::Object(args) = &call.args {
                    for (key, value) in args {
                        out.push_str(&format!("\n    {}: {}", key, display_value(value)));
                    }
                }
            }
        }
        out
    }
}

fn banner(title: &str) -> String {
    let title = format!(" {} ", title);
    let width = title.chars().count();
    let sep = "=".repeat(BANNER_WIDTH.saturating_sub(width) / 2);
    let trailing = if width % 2 == 1 {
        format!("{}=", sep)
    } else {
        sep.clone()
    };
    format!("{}{}{}", sep, title, trailing)
}

fn title_case(kind: &str) -> String {
    if kind.is_empty() {
        return "Unknown".to_string();
    }
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
