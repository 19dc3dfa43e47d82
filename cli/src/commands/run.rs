//! Single-query command

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;
use vox_agent_core::llm::AnthropicClient;
use vox_agent_core::{Assistant, AssistantRequest, InferenceConfig};

const SYSTEM_PROMPT: &str = "Voce e um assistente conversacional. Use as \
ferramentas disponiveis quando a pergunta exigir e responda sempre com um \
objeto JSON no formato {\"resposta\": \"...\"}.";

/// Answer one query and print the reply
pub async fn run_command(query: String, config: InferenceConfig) -> Result<()> {
    config.validate().context("invalid configuration")?;
    debug!(model = %config.model_id, "starting single-query run");

    let llm = AnthropicClient::new(&config)
        .context("failed to create the LLM client (is VOX_API_KEY set?)")?;
    let assistant = Assistant::new(Arc::new(llm), SYSTEM_PROMPT, config);

    let reply = assistant.handle(AssistantRequest::new(query)).await;

    println!("{}", serde_json::to_string_pretty(&reply.body)?);

    if reply.status_code != 200 {
        anyhow::bail!("request failed with status {}", reply.status_code);
    }
    Ok(())
}
