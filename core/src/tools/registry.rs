//! Tool registry for managing available tools

use crate::tools::Tool;
use std::collections::BTreeMap;
use std::sync::Arc;

/// In-memory registry mapping tool names to instances.
///
/// Built once at startup and treated as read-only afterwards; listing order
/// is the tool name order, which keeps discovery output stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, overwriting any existing entry with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::debug!("Tool '{}' re-registered, previous entry replaced", name);
        }
    }

    /// Remove a tool by name; absent names only produce a warning
    pub fn unregister(&mut self, name: &str) {
        if self.tools.remove(name).is_none() {
            tracing::warn!("Tool '{}' not found in registry, nothing removed", name);
        }
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all registered tools
    pub fn list(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    /// List all registered tool names
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The traditional fallback set: the three baseline tools that are always
    /// available, even when the protocol server cannot initialize.
    pub fn baseline() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::tools::builtin::CharCountTool::new()));
        registry.register(Arc::new(crate::tools::builtin::TextAnalysisTool::new()));
        registry.register(Arc::new(crate::tools::builtin::CalculatorTool::new()));
        registry
    }

    /// The full tool set served through the protocol tool server.
    pub fn full() -> Self {
        let mut registry = Self::baseline();
        registry.register(Arc::new(crate::tools::builtin::SentimentTool::new()));
        registry.register(Arc::new(crate::tools::builtin::EmailExtractTool::new()));
        registry.register(Arc::new(crate::tools::builtin::HashTool::new()));
        registry.register(Arc::new(crate::tools::builtin::CepLookupTool::new()));
        registry.register(Arc::new(crate::tools::builtin::CountryInfoTool::new()));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::tools::ToolArgs;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        async fn execute(&self, _args: &ToolArgs) -> Result<Value> {
            Ok(json!({"name": self.0}))
        }
    }

    #[test]
    fn baseline_registry_has_the_three_traditional_tools() {
        let registry = ToolRegistry::baseline();
        assert_eq!(
            registry.names(),
            vec!["analisar_texto", "calculadora_basica", "contador_caracteres"]
        );
    }

    #[test]
    fn full_registry_has_all_tools() {
        let registry = ToolRegistry::full();
        let names = registry.names();

        let expected = [
            "analisar_sentimento",
            "analisar_texto",
            "calculadora_basica",
            "consulta_endereco_por_cep",
            "consulta_informacoes_pais",
            "contador_caracteres",
            "extrair_emails",
            "gerar_hash",
        ];

        assert_eq!(names.len(), expected.len());
        for name in expected {
            assert!(names.contains(&name.to_string()), "missing tool '{}'", name);
        }

        for name in registry.names() {
            let tool = registry.get(&name).unwrap();
            assert_eq!(tool.name(), name);
            assert!(!tool.description().is_empty());
        }
    }

    #[test]
    fn register_overwrites_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("dup")));
        registry.register(Arc::new(NamedTool("dup")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_missing_is_a_no_op() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("a")));
        registry.unregister("missing");
        assert_eq!(registry.len(), 1);
        registry.unregister("a");
        assert!(registry.is_empty());
    }
}
