//! # vox CLI
//!
//! Command-line interface for vox-agent - a voice-enabled conversational
//! assistant.
//!
//! ## Usage
//!
//! - `vox "question"` - Answer a single query
//! - `vox tools` - Show the discovered tools

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{run_command, tools_command};

/// vox - a voice-enabled conversational assistant
#[derive(Parser)]
#[command(name = "vox")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A voice-enabled conversational assistant with tool calling")]
#[command(long_about = None)]
struct Cli {
    /// API key override
    #[arg(long, env = "VOX_API_KEY")]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Maximum number of agent steps
    #[arg(long)]
    max_steps: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// The query to answer (if provided, runs in single-query mode)
    query: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the discovered tools
    Tools,
}

fn build_config(cli: &Cli) -> vox_agent_core::InferenceConfig {
    let mut config = vox_agent_core::InferenceConfig::from_env();

    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(model) = &cli.model {
        config.model_id = model.clone();
    }
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }

    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    vox_agent_core::init_tracing_with_debug(cli.verbose);

    match (&cli.query, &cli.command) {
        (_, Some(Commands::Tools)) => tools_command().await,
        (Some(query), None) => {
            let config = build_config(&cli);
            run_command(query.clone(), config).await
        }
        (None, None) => {
            eprintln!("Nothing to do. Try `vox \"your question\"` or `vox tools`.");
            std::process::exit(2);
        }
    }
}
