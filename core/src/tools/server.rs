//! Protocol tool server
//!
//! Publishes the tools of a registry behind a metadata surface, the way a
//! dedicated tool server advertises its functions to clients. Instances are
//! constructed explicitly and passed where needed.

use crate::error::DiscoveryError;
use crate::tools::discovery::ToolSource;
use crate::tools::{Tool, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Published metadata for one server-side tool.
pub struct ToolFunction {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handle: Arc<dyn Tool>,
}

/// Serves a registry's tools over the single-string calling convention.
pub struct ToolServer {
    registry: ToolRegistry,
}

impl ToolServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Full metadata listing for every served tool.
    pub fn functions(&self) -> Vec<ToolFunction> {
        self.registry
            .list()
            .into_iter()
            .map(|tool| ToolFunction {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "input": {
                            "type": "string",
                            "description": "Tool input as a single string",
                        }
                    },
                    "required": ["input"],
                }),
                handle: tool,
            })
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl ToolSource for ToolServer {
    fn label(&self) -> &str {
        "tool-server"
    }

    fn provide(&self) -> Result<Vec<Arc<dyn Tool>>, DiscoveryError> {
        let tools = self.registry.list();
        debug!(count = tools.len(), "serving tool listing");
        Ok(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_every_registered_tool_with_metadata() {
        let server = ToolServer::new(ToolRegistry::full());
        let functions = server.functions();

        assert_eq!(functions.len(), 8);
        for function in &functions {
            assert!(!function.description.is_empty());
            assert_eq!(function.input_schema["required"][0], "input");
            assert_eq!(function.handle.name(), function.name);
        }
    }

    #[test]
    fn names_match_the_underlying_registry() {
        let registry = ToolRegistry::baseline();
        let expected = registry.names();
        let server = ToolServer::new(registry);

        assert_eq!(server.names(), expected);
        assert_eq!(server.len(), 3);
    }
}
