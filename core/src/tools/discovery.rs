//! Two-tier tool discovery
//!
//! Tools are taken from a primary source when one is configured and
//! answering, otherwise from a fallback source. Both tiers failing yields an
//! empty set, never an error, so the caller always receives a usable (if
//! reduced) tool list.

use crate::config::SummaryLimits;
use crate::error::DiscoveryError;
use crate::tools::wrapper::{wrap_all, WrappedTool};
use crate::tools::{Tool, ToolRegistry};
use std::sync::Arc;
use tracing::{info, warn};

/// A tier that can enumerate tools.
pub trait ToolSource: Send + Sync {
    /// Short identifier used in logs and error sources.
    fn label(&self) -> &str;

    fn provide(&self) -> Result<Vec<Arc<dyn Tool>>, DiscoveryError>;
}

impl ToolSource for ToolRegistry {
    fn label(&self) -> &str {
        "registry"
    }

    fn provide(&self) -> Result<Vec<Arc<dyn Tool>>, DiscoveryError> {
        Ok(self.list())
    }
}

/// Resolves the active tool set by probing sources in order.
pub struct ToolDiscovery {
    primary: Option<Arc<dyn ToolSource>>,
    fallback: Arc<dyn ToolSource>,
    limits: SummaryLimits,
}

impl ToolDiscovery {
    pub fn new(fallback: Arc<dyn ToolSource>) -> Self {
        Self {
            primary: None,
            fallback,
            limits: SummaryLimits::default(),
        }
    }

    pub fn with_primary(mut self, primary: Arc<dyn ToolSource>) -> Self {
        self.primary = Some(primary);
        self
    }

    pub fn with_limits(mut self, limits: SummaryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the wrapped tools of the first tier that answers.
    ///
    /// Total: source failures step down a tier, and exhausting both tiers
    /// returns an empty list.
    pub fn discover(&self) -> Vec<WrappedTool> {
        if let Some(primary) = &self.primary {
            match primary.provide() {
                Ok(tools) => {
                    info!(source = primary.label(), count = tools.len(), "loaded tools");
                    return wrap_all(tools, self.limits);
                }
                Err(err) => {
                    info!(
                        source = primary.label(),
                        error = %err,
                        "primary source unavailable, falling back"
                    );
                }
            }
        }

        match self.fallback.provide() {
            Ok(tools) => {
                info!(
                    source = self.fallback.label(),
                    count = tools.len(),
                    "loaded fallback tools"
                );
                wrap_all(tools, self.limits)
            }
            Err(err) => {
                warn!(source = self.fallback.label(), error = %err, "no tools found");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::server::ToolServer;
    use crate::tools::wrapper::InputParser;

    struct DownSource;

    impl ToolSource for DownSource {
        fn label(&self) -> &str {
            "down"
        }

        fn provide(&self) -> Result<Vec<Arc<dyn Tool>>, DiscoveryError> {
            Err(DiscoveryError::Unavailable {
                tier: "down".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    #[test]
    fn primary_tier_wins_when_available() {
        let server = ToolServer::new(ToolRegistry::full());
        let discovery = ToolDiscovery::new(Arc::new(ToolRegistry::baseline()))
            .with_primary(Arc::new(server));

        assert_eq!(discovery.discover().len(), 8);
    }

    #[test]
    fn unavailable_primary_falls_back_to_the_baseline_tools() {
        let discovery =
            ToolDiscovery::new(Arc::new(ToolRegistry::baseline())).with_primary(Arc::new(DownSource));

        let tools = discovery.discover();
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();

        assert_eq!(
            names,
            vec!["analisar_texto", "calculadora_basica", "contador_caracteres"]
        );
        for tool in &tools {
            assert_ne!(tool.parser(), InputParser::Passthrough, "{}", tool.name());
        }
    }

    #[test]
    fn no_primary_goes_straight_to_the_fallback() {
        let discovery = ToolDiscovery::new(Arc::new(ToolRegistry::baseline()));
        assert_eq!(discovery.discover().len(), 3);
    }

    #[test]
    fn both_tiers_failing_yields_an_empty_set() {
        let discovery = ToolDiscovery::new(Arc::new(DownSource)).with_primary(Arc::new(DownSource));
        assert!(discovery.discover().is_empty());
    }
}
