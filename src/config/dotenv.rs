//! `.env` file provider.
//!
//! The file is parsed once with `dotenvy` into memory; the process
//! environment is never modified.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult, MemoryConfigProvider};

#[derive(Debug, Clone)]
pub struct DotenvConfigProvider {
    values: MemoryConfigProvider,
}

impl DotenvConfigProvider {
    /// Parse `path`. A missing file yields an empty provider; unreadable or
    /// malformed files are errors.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                debug!(path = %path.display(), "No .env file");
                return Ok(Self::empty());
            }
            Err(e) => return Err(convert(e, path)),
        };

        let mut data = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| convert(e, path))?;
            data.insert(key, value);
        }
        debug!(path = %path.display(), keys = data.len(), "Loaded .env file");
        Ok(Self {
            values: MemoryConfigProvider::from_data(data).with_name("dotenv"),
        })
    }

    pub fn empty() -> Self {
        Self {
            values: MemoryConfigProvider::named("dotenv"),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn convert(err: dotenvy::Error, path: &Path) -> ConfigError {
    match err {
        dotenvy::Error::Io(e) => ConfigError::Io(e),
        other => ConfigError::Provider {
            message: format!("{}: {}", path.display(), other),
        },
    }
}

#[async_trait::async_trait]
impl ConfigProvider for DotenvConfigProvider {
    fn name(&self) -> &str {
        "dotenv"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        self.values.get_raw(key).await
    }
}
