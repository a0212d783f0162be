//! Configuration Provider Trait

use std::fmt::Display;
use std::str::FromStr;

use super::{ConfigError, ConfigResult};

/// Read-only source of raw configuration values.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Get a raw configuration value
    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;
}

/// Extension methods for typed configuration access
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a value parsed with [`FromStr`]; blank values count as unset.
    fn get<T>(&self, key: &str) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
        T: FromStr + Send,
        T::Err: Display,
    {
        async move {
            match self.get_raw(key).await? {
                Some(raw) if !raw.trim().is_empty() => {
                    let value = raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    })?;
                    Ok(Some(value))
                }
                _ => Ok(None),
            }
        }
    }

    /// Get a comma-separated list, trimming entries and dropping empty ones.
    fn get_list(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<Vec<String>>>> + Send
    where
        Self: Sync,
    {
        async move {
            Ok(self.get_raw(key).await?.map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect()
            }))
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}
