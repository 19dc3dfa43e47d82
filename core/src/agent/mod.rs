//! Conversational agent loop

use crate::error::{AgentError, Result};
use crate::llm::{ChatOptions, ContentBlock, LlmClient, LlmMessage, MessageRole};
use crate::tools::WrappedTool;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One exported conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

/// Agent that answers user queries, calling tools as the model requests.
///
/// All tools are exposed over the single-string convention; a tool round
/// cannot fail, so the loop only ends on a text-only response or on the
/// step bound.
pub struct AssistantAgent {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    tools: Vec<WrappedTool>,
    history: Vec<LlmMessage>,
    max_steps: usize,
    options: ChatOptions,
}

impl AssistantAgent {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>, tools: Vec<WrappedTool>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
            tools,
            history: Vec::new(),
            max_steps: 10,
            options: ChatOptions::default(),
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tools(&self) -> &[WrappedTool] {
        &self.tools
    }

    /// Replaces the tool set, e.g. after a re-discovery.
    pub fn set_tools(&mut self, tools: Vec<WrappedTool>) {
        self.tools = tools;
    }

    /// Runs the query to completion and returns the model's final text.
    pub async fn invoke(&mut self, user_input: &str) -> Result<String> {
        self.history.push(LlmMessage::user(user_input));

        let definitions: Vec<_> = self.tools.iter().map(WrappedTool::definition).collect();
        let tool_defs = if definitions.is_empty() {
            None
        } else {
            Some(definitions)
        };

        for step in 1..=self.max_steps {
            debug!(step, "agent step");

            let mut messages = vec![LlmMessage::system(self.system_prompt.clone())];
            messages.extend(self.history.iter().cloned());

            let response = self
                .llm
                .chat_completion(messages, tool_defs.clone(), Some(self.options.clone()))
                .await?;

            let message = response.message;
            self.history.push(message.clone());

            if !message.has_tool_use() {
                let text = message.get_text().unwrap_or_default();
                info!(steps = step, "agent finished");
                return Ok(text);
            }

            let mut results = Vec::new();
            for block in message.get_tool_uses() {
                let ContentBlock::ToolUse { id, name, input } = block else {
                    continue;
                };
                let input_text = match input.get("input").and_then(|v| v.as_str()) {
                    Some(text) => text.to_string(),
                    None => input.to_string(),
                };
                let content = match self.tools.iter().find(|t| t.name() == name) {
                    Some(tool) => {
                        info!(tool = %name, "executing tool");
                        tool.call(&input_text).await
                    }
                    None => {
                        warn!(tool = %name, "model requested an unknown tool");
                        format!("Erro: tool '{}' nao encontrada", name)
                    }
                };
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id.clone(),
                    content,
                });
            }
            self.history.push(LlmMessage::tool_results(results));
        }

        Err(AgentError::MaxStepsExceeded {
            max_steps: self.max_steps,
        }
        .into())
    }

    /// Replaces the conversation history with imported turns.
    ///
    /// Only user and assistant text turns are accepted; anything else is
    /// skipped so a malformed import cannot corrupt the conversation.
    pub fn load_history(&mut self, entries: &[HistoryEntry]) {
        self.history.clear();
        for entry in entries {
            match entry.role.as_str() {
                "user" => self.history.push(LlmMessage::user(entry.content.clone())),
                "assistant" => self
                    .history
                    .push(LlmMessage::assistant(entry.content.clone())),
                other => debug!(role = other, "skipping history entry with unknown role"),
            }
        }
    }

    /// Exports the text-bearing turns in order.
    pub fn export_history(&self) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .filter_map(|message| {
                let role = match message.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                    MessageRole::System => return None,
                };
                message.get_text().map(|content| HistoryEntry {
                    role: role.to_string(),
                    content,
                })
            })
            .collect()
    }
}
