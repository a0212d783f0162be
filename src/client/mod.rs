//! HTTP clients for the remote agent run and the Arcade API.

pub mod arcade;
pub mod graph;
mod request;
pub mod retry;
mod streaming;

pub use arcade::{ArcadeClient, AuthorizationResponse, AuthorizationStatus};
pub use graph::{RemoteGraph, RemoteGraphConfig};
pub use request::{check_response, join_url};
pub use retry::RetryPolicy;
pub use streaming::{SseEvent, SseParser};
