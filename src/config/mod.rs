//! Layered configuration: process environment first, then a `.env` file.
//!
//! ```rust,no_run
//! use mailbox_agent::config::{ConfigBuilder, Settings};
//!
//! # async fn example() -> Result<(), mailbox_agent::Error> {
//! let provider = ConfigBuilder::new().env().dotenv(".env")?.build();
//! let settings = Settings::load(&provider).await?;
//! println!("acting for {}", settings.user_id);
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod dotenv;
pub mod env;
pub mod memory;
pub mod provider;
pub mod settings;

pub use composite::CompositeConfigProvider;
pub use dotenv::DotenvConfigProvider;
pub use env::EnvConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::Settings;

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required key not set by any provider
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found
        key: String,
    },

    /// Value present but unusable
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// IO error (reading `.env`)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// Provider error
    #[error("Provider error: {message}")]
    Provider {
        /// Error message
        message: String,
    },

    /// Multiple validation errors
    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: ")?;
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Fluent assembly of a [`CompositeConfigProvider`]; earlier layers win.
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add the process environment
    pub fn env(mut self) -> Self {
        self.providers.push(Box::new(EnvConfigProvider::new()));
        self
    }

    /// Add a `.env` file; a missing file contributes nothing
    pub fn dotenv(mut self, path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        self.providers
            .push(Box::new(DotenvConfigProvider::load(path.as_ref())?));
        Ok(self)
    }

    pub fn memory(mut self, provider: MemoryConfigProvider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> CompositeConfigProvider {
        self.providers
            .into_iter()
            .fold(CompositeConfigProvider::new(), |composite, provider| {
                composite.provider(provider)
            })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound {
            key: "OPENAI_MODEL".to_string(),
        };
        assert!(err.to_string().contains("OPENAI_MODEL"));

        let errors = ValidationErrors(vec![
            ConfigError::NotFound {
                key: "ARCADE_USER_ID".into(),
            },
            ConfigError::NotFound {
                key: "OPENAI_MODEL".into(),
            },
        ]);
        assert_eq!(
            errors.to_string(),
            "Validation failed: Key not found: ARCADE_USER_ID; Key not found: OPENAI_MODEL"
        );
    }

    #[test]
    fn test_config_builder_layers() {
        let composite = ConfigBuilder::new()
            .env()
            .dotenv("/nonexistent/.env")
            .unwrap()
            .memory(MemoryConfigProvider::named("defaults"))
            .build();
        assert_eq!(composite.provider_names(), vec!["env", "dotenv", "defaults"]);
    }
}
