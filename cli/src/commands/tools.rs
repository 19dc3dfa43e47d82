//! Tools listing command

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use vox_agent_core::tools::{ToolDiscovery, ToolRegistry, ToolServer};

/// Show the discovered tools
pub async fn tools_command() -> Result<()> {
    info!("Listing discovered tools");

    let server = ToolServer::new(ToolRegistry::full());
    let discovery =
        ToolDiscovery::new(Arc::new(ToolRegistry::baseline())).with_primary(Arc::new(server));

    println!("Available tools\n");

    for tool in discovery.discover() {
        println!("  {}", tool.name());
        // First line of the description keeps the listing compact
        let first_line = tool.description().lines().next().unwrap_or_default();
        println!("      {}\n", first_line);
    }

    Ok(())
}
