//! # vox-agent Core
//!
//! Core library for vox-agent - a voice-enabled conversational assistant.
//!
//! This library provides tool discovery, adaptation and invocation: the tool
//! contract and its built-in implementations, the protocol tool server, the
//! two-tier discovery pipeline, the single-string wrapper layer, response
//! normalization, and the agent/handler machinery that ties them together.

// Core modules
pub mod agent;
pub mod config;
pub mod error;
pub mod handler;
pub mod llm;
pub mod response;
pub mod speech;
pub mod tools;

// Re-export commonly used types
pub use agent::{AssistantAgent, HistoryEntry};
pub use config::{InferenceConfig, SummaryLimits};
pub use error::{Error, Result};
pub use handler::{Assistant, AssistantReply, AssistantRequest};
pub use tools::{Tool, ToolDiscovery, ToolRegistry, ToolServer, WrappedTool};

/// Current version of the vox-agent core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
