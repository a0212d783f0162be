//! Agent run hosted by a remote graph server.
//!
//! Each attempt is one `POST /threads/{thread_id}/runs/stream` call streaming
//! `updates` over SSE. The server checkpoints the thread, so a resume is the
//! same call with a `command.resume` body instead of fresh input.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::request::{check_response, join_url};
use super::streaming::{SseEvent, SseParser};
use crate::agent::{AgentRun, UnitStream};
use crate::types::{RunInput, StreamUnit, ThreadId};
use crate::{Error, Result};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:2024";
pub const DEFAULT_ASSISTANT_ID: &str = "agent";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection and run configuration for [`RemoteGraph`].
#[derive(Debug, Clone)]
pub struct RemoteGraphConfig {
    pub base_url: String,
    pub assistant_id: String,
    pub api_key: Option<SecretString>,
    /// Sent as `config.configurable` on every run, next to the thread id.
    pub configurable: Map<String, Value>,
}

impl RemoteGraphConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            assistant_id: DEFAULT_ASSISTANT_ID.to_string(),
            api_key: None,
            configurable: Map::new(),
        }
    }

    pub fn assistant_id(mut self, assistant_id: impl Into<String>) -> Self {
        self.assistant_id = assistant_id.into();
        self
    }

    pub fn api_key(mut self, api_key: Option<SecretString>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn configurable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configurable.insert(key.into(), value.into());
        self
    }
}

impl Default for RemoteGraphConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

pub struct RemoteGraph {
    http: reqwest::Client,
    config: RemoteGraphConfig,
}

impl RemoteGraph {
    pub fn new(config: RemoteGraphConfig) -> Result<Self> {
        // No overall timeout: a stream stays open while the model and tools work.
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(Error::Network)?;
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: RemoteGraphConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &RemoteGraphConfig {
        &self.config
    }

    fn stream_url(&self, thread: &ThreadId) -> String {
        join_url(
            &self.config.base_url,
            &format!("threads/{}/runs/stream", urlencoding::encode(thread.as_str())),
        )
    }

    pub fn request_body(&self, thread: &ThreadId, input: &RunInput) -> Value {
        let mut configurable = self.config.configurable.clone();
        configurable.insert("thread_id".into(), Value::String(thread.to_string()));

        let mut body = json!({
            "assistant_id": self.config.assistant_id,
            "stream_mode": ["updates"],
            "if_not_exists": "create",
            "config": {"configurable": configurable},
        });
        match input {
            RunInput::Messages(messages) => {
                body["input"] = json!({ "messages": messages });
            }
            RunInput::Resume(payload) => {
                body["command"] = json!({ "resume": payload });
            }
        }
        body
    }
}

#[async_trait]
impl AgentRun for RemoteGraph {
    async fn stream(&self, thread: &ThreadId, input: RunInput) -> Result<UnitStream> {
        let url = self.stream_url(thread);
        let body = self.request_body(thread, &input);
        debug!(thread_id = %thread, resume = input.is_resume(), %url, "Starting run stream");

        let mut request = self
            .http
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key.expose_secret());
        }

        let response = check_response(request.send().await?).await?;
        let units = SseParser::new(response.bytes_stream())
            .filter_map(|event| async move { event.and_then(unit_from_event).transpose() });
        Ok(Box::pin(units))
    }
}

/// Map one SSE event to a stream unit. `updates` events (subgraph ones
/// included) carry units; `error` events fail the attempt; everything else
/// (`metadata`, `end`, ...) is skipped.
fn unit_from_event(event: SseEvent) -> Result<Option<StreamUnit>> {
    match event.event.as_deref() {
        None => parse_unit(&event.data).map(Some),
        Some(name) if name == "updates" || name.starts_with("updates|") => {
            parse_unit(&event.data).map(Some)
        }
        Some("error") => Err(Error::Run(describe_error(&event.data))),
        Some(other) => {
            debug!(event = other, "Skipping stream event");
            Ok(None)
        }
    }
}

fn parse_unit(data: &str) -> Result<StreamUnit> {
    let value: Value = serde_json::from_str(data).inspect_err(|e| {
        warn!(error = %e, data, "Failed to parse stream unit");
    })?;
    StreamUnit::from_value(value)
}

fn describe_error(data: &str) -> String {
    match serde_json::from_str::<Value>(data) {
        Ok(value) => {
            let kind = value.get("error").and_then(Value::as_str);
            let message = value.get("message").and_then(Value::as_str);
            match (kind, message) {
                (Some(kind), Some(message)) => format!("{}: {}", kind, message),
                (Some(text), None) | (None, Some(text)) => text.to_string(),
                (None, None) => value.to_string(),
            }
        }
        Err(_) => data.to_string(),
    }
}
