//! Composite Configuration Provider
//!
//! Chains providers with priority ordering; earlier providers win.

use tracing::trace;

use super::ConfigResult;
use super::provider::ConfigProvider;

pub struct CompositeConfigProvider {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a provider (first added = highest priority)
    pub fn add_provider(&mut self, provider: Box<dyn ConfigProvider>) {
        self.providers.push(provider);
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl Default for CompositeConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for CompositeConfigProvider {
    fn name(&self) -> &str {
        "composite"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        for provider in &self.providers {
            if let Some(value) = provider.get_raw(key).await? {
                trace!(key, provider = provider.name(), "Resolved config key");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for CompositeConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeConfigProvider")
            .field("provider_count", &self.providers.len())
            .field("provider_names", &self.provider_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::memory::MemoryConfigProvider;

    #[tokio::test]
    async fn test_composite_provider_priority() {
        let env = MemoryConfigProvider::named("env").value("OPENAI_MODEL", "gpt-4o");
        let dotenv = MemoryConfigProvider::named("dotenv")
            .value("OPENAI_MODEL", "gpt-4o-mini")
            .value("ARCADE_USER_ID", "user@example.com");

        let composite = CompositeConfigProvider::new()
            .provider(Box::new(env))
            .provider(Box::new(dotenv));

        assert_eq!(
            composite.get_raw("OPENAI_MODEL").await.unwrap(),
            Some("gpt-4o".to_string())
        );
        assert_eq!(
            composite.get_raw("ARCADE_USER_ID").await.unwrap(),
            Some("user@example.com".to_string())
        );
        assert_eq!(composite.get_raw("THREAD_ID").await.unwrap(), None);
    }

    #[test]
    fn test_composite_provider_names() {
        let mut composite = CompositeConfigProvider::new();
        composite.add_provider(Box::new(MemoryConfigProvider::named("first")));
        composite.add_provider(Box::new(MemoryConfigProvider::named("second")));

        assert_eq!(composite.provider_count(), 2);
        assert_eq!(composite.provider_names(), vec!["first", "second"]);
    }
}
