//! Typed runtime settings resolved from the provider chain.

use std::time::Duration;

use secrecy::SecretString;

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigError, ConfigResult, ValidationErrors};
use crate::catalog::{CatalogQuery, DEFAULT_TOOL_LIMIT, DEFAULT_TOOLKITS};
use crate::types::ThreadId;

pub const DEFAULT_ARCADE_BASE_URL: &str = "https://api.arcade.dev";

pub mod keys {
    pub const ARCADE_USER_ID: &str = "ARCADE_USER_ID";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const ARCADE_API_KEY: &str = "ARCADE_API_KEY";
    pub const ARCADE_BASE_URL: &str = "ARCADE_BASE_URL";
    pub const AGENT_SERVER_URL: &str = "AGENT_SERVER_URL";
    pub const AGENT_API_KEY: &str = "AGENT_API_KEY";
    pub const AGENT_ASSISTANT_ID: &str = "AGENT_ASSISTANT_ID";
    pub const THREAD_ID: &str = "THREAD_ID";
    pub const TOOLKITS: &str = "TOOLKITS";
    pub const TOOLS: &str = "TOOLS";
    pub const TOOL_LIMIT: &str = "TOOL_LIMIT";
    pub const AUTH_WAIT_TIMEOUT_SECS: &str = "AUTH_WAIT_TIMEOUT_SECS";
    pub const MAX_RESUMES: &str = "MAX_RESUMES";
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Identity the tools act for.
    pub user_id: String,
    pub model: String,
    pub arcade_api_key: Option<SecretString>,
    pub arcade_base_url: String,
    pub server_url: String,
    pub agent_api_key: Option<SecretString>,
    pub assistant_id: String,
    pub thread_id: ThreadId,
    pub toolkits: Vec<String>,
    pub tools: Vec<String>,
    pub tool_limit: usize,
    pub auth_wait_timeout: Option<Duration>,
    pub max_resumes: Option<usize>,
}

impl Settings {
    /// Resolve every key. Missing required keys and unparsable numbers are
    /// all reported together.
    pub async fn load(provider: &dyn ConfigProvider) -> ConfigResult<Self> {
        let mut errors = Vec::new();

        let user_id = required(provider, keys::ARCADE_USER_ID, &mut errors).await?;
        let model = required(provider, keys::OPENAI_MODEL, &mut errors).await?;

        let tool_limit = collect(provider.get::<usize>(keys::TOOL_LIMIT).await, &mut errors);
        let wait_secs = collect(
            provider.get::<u64>(keys::AUTH_WAIT_TIMEOUT_SECS).await,
            &mut errors,
        );
        let max_resumes = collect(provider.get::<usize>(keys::MAX_RESUMES).await, &mut errors);

        if !errors.is_empty() {
            return Err(ConfigError::ValidationErrors(ValidationErrors(errors)));
        }

        Ok(Self {
            user_id: user_id.unwrap_or_default(),
            model: model.unwrap_or_default(),
            arcade_api_key: secret(provider, keys::ARCADE_API_KEY).await?,
            arcade_base_url: optional(provider, keys::ARCADE_BASE_URL)
                .await?
                .unwrap_or_else(|| DEFAULT_ARCADE_BASE_URL.to_string()),
            server_url: optional(provider, keys::AGENT_SERVER_URL)
                .await?
                .unwrap_or_else(|| crate::client::graph::DEFAULT_SERVER_URL.to_string()),
            agent_api_key: secret(provider, keys::AGENT_API_KEY).await?,
            assistant_id: optional(provider, keys::AGENT_ASSISTANT_ID)
                .await?
                .unwrap_or_else(|| crate::client::graph::DEFAULT_ASSISTANT_ID.to_string()),
            thread_id: optional(provider, keys::THREAD_ID)
                .await?
                .map(ThreadId::from)
                .unwrap_or_else(ThreadId::random),
            toolkits: provider
                .get_list(keys::TOOLKITS)
                .await?
                .unwrap_or_else(|| DEFAULT_TOOLKITS.iter().map(|s| s.to_string()).collect()),
            tools: provider.get_list(keys::TOOLS).await?.unwrap_or_default(),
            tool_limit: tool_limit.flatten().unwrap_or(DEFAULT_TOOL_LIMIT),
            auth_wait_timeout: wait_secs.flatten().map(Duration::from_secs),
            max_resumes: max_resumes.flatten(),
        })
    }

    pub fn catalog_query(&self) -> CatalogQuery {
        CatalogQuery::new(self.user_id.clone())
            .toolkits(self.toolkits.clone())
            .tools(self.tools.clone())
            .limit(self.tool_limit)
    }
}

/// Trimmed value, with blank treated as unset.
async fn optional(provider: &dyn ConfigProvider, key: &str) -> ConfigResult<Option<String>> {
    Ok(provider
        .get_raw(key)
        .await?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

async fn required(
    provider: &dyn ConfigProvider,
    key: &str,
    errors: &mut Vec<ConfigError>,
) -> ConfigResult<Option<String>> {
    let value = optional(provider, key).await?;
    if value.is_none() {
        errors.push(ConfigError::NotFound {
            key: key.to_string(),
        });
    }
    Ok(value)
}

async fn secret(provider: &dyn ConfigProvider, key: &str) -> ConfigResult<Option<SecretString>> {
    Ok(optional(provider, key).await?.map(SecretString::from))
}

fn collect<T>(result: ConfigResult<T>, errors: &mut Vec<ConfigError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}
