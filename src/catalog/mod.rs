//! Tool catalog: resolves which tools the agent is allowed to call.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_TOOLKITS: &[&str] = &["OutlookMail"];
pub const DEFAULT_TOOL_LIMIT: usize = 100;

/// Which tools to fetch, and on whose behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub user_id: String,
    pub toolkits: Vec<String>,
    pub tools: Vec<String>,
    pub limit: usize,
}

impl CatalogQuery {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            toolkits: DEFAULT_TOOLKITS.iter().map(|s| s.to_string()).collect(),
            tools: Vec::new(),
            limit: DEFAULT_TOOL_LIMIT,
        }
    }

    pub fn toolkits(mut self, toolkits: Vec<String>) -> Self {
        self.toolkits = toolkits;
        self
    }

    pub fn tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolkitRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A tool definition as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub qualified_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub toolkit: Option<ToolkitRef>,
}

impl ToolDefinition {
    /// `Toolkit.Tool` form, falling back to the toolkit and bare name.
    pub fn qualified(&self) -> String {
        if let Some(name) = self.qualified_name.as_ref().filter(|n| !n.is_empty()) {
            return name.clone();
        }
        match &self.toolkit {
            Some(toolkit) => format!("{}.{}", toolkit.name, self.name),
            None => self.name.clone(),
        }
    }

    /// Name the model sees; dots are not allowed in function names.
    pub fn agent_name(&self) -> String {
        self.qualified().replace('.', "_")
    }

    fn dedup_key(&self) -> String {
        self.fully_qualified_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.qualified())
    }
}

#[async_trait]
pub trait ToolCatalog: Send + Sync {
    async fn list_tools(&self, query: &CatalogQuery) -> Result<Vec<ToolDefinition>>;
}

/// Drop repeats (first occurrence wins) and keep at most `limit` tools.
pub fn dedup_and_cap(tools: Vec<ToolDefinition>, limit: usize) -> Vec<ToolDefinition> {
    let mut seen = HashSet::new();
    tools
        .into_iter()
        .filter(|tool| seen.insert(tool.dedup_key()))
        .take(limit)
        .collect()
}
