//! Arcade API client: authorization status polling and tool listing.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::request::{check_response, join_url};
use super::retry::RetryPolicy;
use crate::agent::AuthorizationChannel;
use crate::catalog::{CatalogQuery, ToolCatalog, ToolDefinition, dedup_and_cap};
use crate::{Error, Result};

/// Longest wait the status endpoint accepts per long-poll.
pub const MAX_STATUS_WAIT: Duration = Duration::from_secs(59);
const DEFAULT_MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub status: AuthorizationStatus,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToolPage {
    #[serde(default)]
    items: Vec<ToolDefinition>,
}

pub struct ArcadeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    retry: RetryPolicy,
    status_wait: Duration,
    min_poll_interval: Duration,
}

impl ArcadeClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<SecretString>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(MAX_STATUS_WAIT + REQUEST_TIMEOUT_MARGIN)
            .build()
            .map_err(Error::Network)?;
        Ok(Self::with_http(base_url, api_key, http))
    }

    pub fn with_http(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
            retry: RetryPolicy::default(),
            status_wait: MAX_STATUS_WAIT,
            min_poll_interval: DEFAULT_MIN_POLL_INTERVAL,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Server-side wait per status request and the minimum spacing between
    /// requests when the server answers `pending` early.
    pub fn with_polling(mut self, status_wait: Duration, min_interval: Duration) -> Self {
        self.status_wait = status_wait.min(MAX_STATUS_WAIT);
        self.min_poll_interval = min_interval;
        self
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> reqwest::RequestBuilder {
        let request = self.http.get(with_query(join_url(&self.base_url, path), query));
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = check_response(self.get(path, query).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) => match self.retry.next_delay(retries, &e) {
                    Some(delay) => {
                        retries += 1;
                        warn!(operation, retry = retries, error = %e, ?delay, "Retrying Arcade request");
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    /// One status request. With `wait`, the server holds the request until
    /// the status changes or the wait elapses.
    pub async fn authorization_status(
        &self,
        authorization_id: &str,
        wait: Option<Duration>,
    ) -> Result<AuthorizationResponse> {
        let mut query = vec![("id", authorization_id.to_string())];
        if let Some(wait) = wait {
            query.push(("wait", wait.as_secs().to_string()));
        }
        self.get_json("v1/auth/status", &query).await
    }

    async fn list_toolkit(&self, toolkit: &str, query: &CatalogQuery) -> Result<Vec<ToolDefinition>> {
        let params = [
            ("toolkit", toolkit.to_string()),
            ("limit", query.limit.to_string()),
            ("user_id", query.user_id.clone()),
        ];
        let page: ToolPage = self
            .with_retry("list_tools", || self.get_json("v1/tools", &params))
            .await?;
        debug!(toolkit, count = page.items.len(), "Listed toolkit");
        Ok(page.items)
    }

    async fn tool_definition(&self, name: &str, user_id: &str) -> Result<ToolDefinition> {
        let params = [("name", name.to_string()), ("user_id", user_id.to_string())];
        self.with_retry("tool_definition", || {
            self.get_json("v1/tools/definition", &params)
        })
        .await
    }
}

fn with_query(url: String, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return url;
    }
    let pairs: Vec<String> = query
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();
    format!("{}?{}", url, pairs.join("&"))
}

#[async_trait]
impl AuthorizationChannel for ArcadeClient {
    async fn wait_for_completion(&self, authorization_id: &str) -> Result<()> {
        loop {
            let started = Instant::now();
            let response = self
                .with_retry("auth_status", || {
                    self.authorization_status(authorization_id, Some(self.status_wait))
                })
                .await?;

            match response.status {
                AuthorizationStatus::Completed => {
                    info!(authorization_id, "Authorization completed");
                    return Ok(());
                }
                AuthorizationStatus::Failed => {
                    return Err(Error::Authorization(format!(
                        "authorization {} failed",
                        authorization_id
                    )));
                }
                AuthorizationStatus::Unknown => {
                    return Err(Error::Authorization(format!(
                        "authorization {} ended with an unrecognized status",
                        authorization_id
                    )));
                }
                AuthorizationStatus::Pending => {
                    debug!(authorization_id, "Authorization still pending");
                    let elapsed = started.elapsed();
                    if elapsed < self.min_poll_interval {
                        tokio::time::sleep(self.min_poll_interval - elapsed).await;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl ToolCatalog for ArcadeClient {
    async fn list_tools(&self, query: &CatalogQuery) -> Result<Vec<ToolDefinition>> {
        let mut tools = Vec::new();
        for toolkit in &query.toolkits {
            tools.extend(self.list_toolkit(toolkit, query).await?);
        }
        for name in &query.tools {
            tools.push(self.tool_definition(name, &query.user_id).await?);
        }
        let tools = dedup_and_cap(tools, query.limit);
        info!(count = tools.len(), "Resolved tool catalog");
        Ok(tools)
    }
}
