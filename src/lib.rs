//! # mailbox-agent
//!
//! Interactive agent loop for a mailbox assistant whose tool calls can pause
//! the run until an operator authorizes a credential or approves the call.
//!
//! A remote agent run streams `updates`. Some units carry chat messages, which
//! are rendered as they arrive; others carry interrupts. Each interrupt is
//! classified, resolved against the authorization channel or the operator,
//! and the run is resumed on the same thread with the decisions until a pass
//! finishes without interrupts.
//!
//! ## Driving a turn
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mailbox_agent::{
//!     ArcadeClient, Console, DecisionResolver, RemoteGraph, RemoteGraphConfig, ThreadId,
//!     TurnController,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailbox_agent::Error> {
//!     let arcade = Arc::new(ArcadeClient::new("https://api.arcade.dev", None)?);
//!     let graph = RemoteGraph::new(RemoteGraphConfig::new("http://localhost:2024"))?;
//!     let controller = TurnController::new(Arc::new(graph), DecisionResolver::new(arcade));
//!
//!     let mut console = Console::stdio();
//!     let report = controller
//!         .run_turn(&ThreadId::random(), "List my latest emails", &mut console)
//!         .await?;
//!     println!("finished after {} attempts", report.attempts);
//!     Ok(())
//! }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod agent;
pub mod catalog;
pub mod client;
pub mod config;
pub mod operator;
pub mod session;
pub mod types;

pub use agent::{
    AgentRun, Attempt, AuthorizationChannel, DecisionResolver, InterruptFlow, TurnController,
    TurnReport, UnitStream, classify, run_attempt,
};
pub use catalog::{CatalogQuery, ToolCatalog, ToolDefinition};
pub use client::{ArcadeClient, RemoteGraph, RemoteGraphConfig, RetryPolicy};
pub use config::{ConfigError, ConfigProvider, Settings};
pub use operator::{Console, Notice, Operator};
pub use session::{Session, SessionSummary};
pub use types::{
    AuthorizationHandle, Decision, InputMessage, MessageRecord, NodeUpdate, ResumePayload,
    RunInput, StreamUnit, SuspensionRequest, ThreadId, ToolCall,
};

/// Error type for mailbox-agent operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Remote service returned an error response.
    #[error("API error (HTTP {status}): {message}", status = status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into()))]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal or file I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Event stream could not be decoded.
    #[error("Stream error: {0}")]
    Stream(String),

    /// The agent run reported a failure while streaming.
    #[error("Run failed: {0}")]
    Run(String),

    /// Out-of-band authorization did not complete.
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// Operation exceeded timeout.
    #[error("Operation timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(std::time::Duration),

    /// A turn kept suspending past the configured number of resumes.
    #[error("Turn still suspended after {limit} resumes")]
    TurnLimit { limit: usize },
}

impl Error {
    /// Transient failures worth another attempt against the same endpoint.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => !e.is_builder() && !e.is_decode(),
            Error::Api {
                status: Some(status),
                ..
            } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::Io(e) => Error::Io(e),
            other => Error::Config(config_message(other)),
        }
    }
}

fn config_message(err: config::ConfigError) -> String {
    match err {
        config::ConfigError::NotFound { key } => {
            format!("Missing {}. Add it to your .env file.", key)
        }
        config::ConfigError::ValidationErrors(errors) => errors
            .0
            .into_iter()
            .map(config_message)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
