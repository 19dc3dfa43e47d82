//! Anthropic Claude client implementation

use crate::config::InferenceConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageRole,
    ToolDefinition, Usage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Anthropic Claude client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    config: InferenceConfig,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| LlmError::Authentication {
            message: "No API key found for Anthropic".to_string(),
        })?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.clone(),
            model: config.model_id.clone(),
            config: config.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools, options);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err((LlmError::ApiError {
                status,
                message: error_text,
            })
            .into());
        }

        let anthropic_response: AnthropicResponse =
            response.json().await.map_err(|e| LlmError::Network {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(convert_response(anthropic_response))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }
}

impl AnthropicClient {
    fn build_request(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> AnthropicRequest {
        let options = options.unwrap_or_default();

        // Anthropic takes the system prompt as a top-level field.
        let mut system_message = None;
        let mut conversation_messages = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => {
                    if let Some(text) = message.get_text() {
                        system_message = Some(text);
                    }
                }
                _ => conversation_messages.push(message),
            }
        }

        let max_tokens = options.max_tokens.or(self.config.max_tokens).unwrap_or(4096);
        let temperature = options.temperature.unwrap_or(self.config.temperature);

        AnthropicRequest {
            model: self.model.clone(),
            max_tokens,
            temperature,
            system: system_message,
            messages: conversation_messages,
            tools,
            top_p: options.top_p.or(self.config.top_p),
            stop_sequences: options.stop,
        }
    }
}

fn convert_response(response: AnthropicResponse) -> LlmResponse {
    let blocks: Vec<ContentBlock> = response
        .content
        .into_iter()
        .map(|content| match content {
            AnthropicContent::Text { text } => ContentBlock::Text { text },
            AnthropicContent::ToolUse { id, name, input } => {
                ContentBlock::ToolUse { id, name, input }
            }
        })
        .collect();

    let message = LlmMessage::assistant_blocks(blocks);

    let usage = response.usage.map(|u| Usage {
        prompt_tokens: u.input_tokens,
        completion_tokens: u.output_tokens,
        total_tokens: u.input_tokens + u.output_tokens,
    });

    let finish_reason = match response.stop_reason.as_str() {
        "end_turn" => Some(FinishReason::Stop),
        "max_tokens" => Some(FinishReason::Length),
        "tool_use" => Some(FinishReason::ToolCalls),
        _ => Some(FinishReason::Other(response.stop_reason)),
    };

    LlmResponse {
        message,
        usage,
        model: response.model,
        finish_reason,
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<LlmMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicContent>,
    stop_reason: String,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContent {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_use_responses_become_tool_use_blocks() {
        let raw = json!({
            "model": "claude-3-5-sonnet-20241022",
            "content": [
                {"type": "text", "text": "vou calcular"},
                {"type": "tool_use", "id": "tu_1", "name": "calculadora_basica",
                 "input": {"input": "*,25,8"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });
        let response: AnthropicResponse = serde_json::from_value(raw).unwrap();
        let converted = convert_response(response);

        assert!(converted.message.has_tool_use());
        assert_eq!(converted.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(converted.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn end_turn_maps_to_stop() {
        let raw = json!({
            "model": "claude-3-5-sonnet-20241022",
            "content": [{"type": "text", "text": "pronto"}],
            "stop_reason": "end_turn",
            "usage": null
        });
        let response: AnthropicResponse = serde_json::from_value(raw).unwrap();
        let converted = convert_response(response);

        assert_eq!(converted.finish_reason, Some(FinishReason::Stop));
        assert_eq!(converted.message.get_text().unwrap(), "pronto");
    }
}
