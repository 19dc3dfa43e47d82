//! Assistant entry point
//!
//! Composition root: wires discovery, the agent and the speech seam into a
//! single request/reply surface shaped like a serverless handler. `handle`
//! always returns a reply; failures surface as a 500-shaped body.

use crate::agent::{AssistantAgent, HistoryEntry};
use crate::config::{InferenceConfig, SummaryLimits};
use crate::error::{AgentError, Error, Result};
use crate::llm::LlmClient;
use crate::response::{normalize, RawOutput};
use crate::speech::{prepare_text, NullSynthesizer, SpeechSynthesizer, SynthesisRequest};
use crate::tools::{ToolDiscovery, ToolRegistry, ToolServer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Incoming request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantRequest {
    pub query: String,

    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    #[serde(default = "default_output_format")]
    pub output_format: String,

    #[serde(default = "default_speed")]
    pub speed: String,

    #[serde(default = "default_true")]
    pub use_neural: bool,
}

fn default_voice_id() -> String {
    "Joanna".to_string()
}

fn default_output_format() -> String {
    "mp3".to_string()
}

fn default_speed() -> String {
    "medium".to_string()
}

fn default_true() -> bool {
    true
}

impl AssistantRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            history: Vec::new(),
            voice_id: default_voice_id(),
            output_format: default_output_format(),
            speed: default_speed(),
            use_neural: true,
        }
    }
}

/// Outgoing reply, HTTP-shaped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub status_code: u16,
    pub body: Value,
}

/// The assembled assistant.
pub struct Assistant {
    llm: Arc<dyn LlmClient>,
    discovery: ToolDiscovery,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    system_prompt: String,
    config: InferenceConfig,
}

impl Assistant {
    /// Standard wiring: full registry behind the tool server as the primary
    /// tier, baseline registry as the fallback.
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>, config: InferenceConfig) -> Self {
        let server = ToolServer::new(ToolRegistry::full());
        let discovery = ToolDiscovery::new(Arc::new(ToolRegistry::baseline()))
            .with_primary(Arc::new(server))
            .with_limits(SummaryLimits::default());

        Self {
            llm,
            discovery,
            synthesizer: Arc::new(NullSynthesizer),
            system_prompt: system_prompt.into(),
            config,
        }
    }

    pub fn with_discovery(mut self, discovery: ToolDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Processes one request end to end. Never errors: failures come back
    /// as a 500-shaped reply.
    pub async fn handle(&self, request: AssistantRequest) -> AssistantReply {
        let request_id = Uuid::new_v4();
        info!(%request_id, "handling request");

        match self.process(request, request_id).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(%request_id, error = %err, "request failed");
                AssistantReply {
                    status_code: 500,
                    body: json!({
                        "error": err.to_string(),
                        "message": "Error processing user query",
                        "request_id": request_id,
                    }),
                }
            }
        }
    }

    async fn process(&self, request: AssistantRequest, request_id: Uuid) -> Result<AssistantReply> {
        if request.query.trim().is_empty() {
            return Err(Error::Agent(AgentError::InvalidRequest {
                message: "User query is required".to_string(),
            }));
        }

        // Tools are re-discovered per request so a recovered primary tier
        // is picked up without a restart.
        let tools = self.discovery.discover();
        let tool_names: Vec<String> = tools.iter().map(|t| t.name().to_string()).collect();
        info!(count = tools.len(), "tools loaded for request");

        let mut agent = AssistantAgent::new(self.llm.clone(), self.system_prompt.clone(), tools)
            .with_max_steps(self.config.max_steps);
        if !request.history.is_empty() {
            agent.load_history(&request.history);
        }

        let raw = agent.invoke(&request.query).await?;
        let response = normalize(RawOutput::Text(raw));
        let history = agent.export_history();

        // Voice output comes from the envelope's answer text.
        let tts_text = response
            .get("resposta")
            .or_else(|| response.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("No response available");
        let audio = self
            .synthesizer
            .synthesize(SynthesisRequest {
                text: prepare_text(tts_text),
                voice_id: request.voice_id,
                output_format: request.output_format,
                speed: request.speed,
                use_neural: request.use_neural,
            })
            .await?;
        if !audio.success {
            return Err(Error::Speech(crate::error::SpeechError::SynthesisFailed {
                message: audio.error.unwrap_or_else(|| "unknown".to_string()),
            }));
        }

        Ok(AssistantReply {
            status_code: 200,
            body: json!({
                "message": "Query processed successfully",
                "response": response,
                "model_used": self.llm.model_name(),
                "tools_used": tool_names,
                "total_tools": tool_names.len(),
                "history_length": history.len(),
                "history": history,
                "audio_file": audio.file_path,
                "audio_duration": audio.duration,
                "request_id": request_id,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatOptions, FinishReason, LlmMessage, LlmResponse, ToolDefinition};
    use async_trait::async_trait;

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn chat_completion(
            &self,
            messages: Vec<LlmMessage>,
            _tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            let last = messages
                .last()
                .and_then(|m| m.get_text())
                .unwrap_or_default();
            Ok(LlmResponse {
                message: LlmMessage::assistant(format!("{{\"resposta\": \"eco: {}\"}}", last)),
                usage: None,
                model: "echo".to_string(),
                finish_reason: Some(FinishReason::Stop),
            })
        }

        fn model_name(&self) -> &str {
            "echo"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    fn assistant() -> Assistant {
        Assistant::new(Arc::new(EchoLlm), "Voce e um assistente.", InferenceConfig::default())
    }

    #[tokio::test]
    async fn successful_request_yields_a_200_reply() {
        let reply = assistant().handle(AssistantRequest::new("oi")).await;

        assert_eq!(reply.status_code, 200);
        assert_eq!(reply.body["response"]["resposta"], "eco: oi");
        assert_eq!(reply.body["total_tools"], 8);
        assert_eq!(reply.body["history_length"], 2);
    }

    #[tokio::test]
    async fn empty_query_yields_a_500_reply() {
        let reply = assistant().handle(AssistantRequest::new("   ")).await;

        assert_eq!(reply.status_code, 500);
        assert!(reply.body["error"]
            .as_str()
            .unwrap()
            .contains("User query is required"));
        assert_eq!(reply.body["message"], "Error processing user query");
    }

    #[tokio::test]
    async fn imported_history_is_extended_and_returned() {
        let mut request = AssistantRequest::new("segunda");
        request.history = vec![
            HistoryEntry {
                role: "user".to_string(),
                content: "primeira".to_string(),
            },
            HistoryEntry {
                role: "assistant".to_string(),
                content: "resposta um".to_string(),
            },
        ];

        let reply = assistant().handle(request).await;

        assert_eq!(reply.status_code, 200);
        assert_eq!(reply.body["history_length"], 4);
        assert_eq!(reply.body["history"][0]["content"], "primeira");
    }

    #[tokio::test]
    async fn request_deserialization_fills_defaults() {
        let request: AssistantRequest =
            serde_json::from_value(json!({"query": "oi"})).unwrap();

        assert_eq!(request.voice_id, "Joanna");
        assert_eq!(request.output_format, "mp3");
        assert_eq!(request.speed, "medium");
        assert!(request.use_neural);
        assert!(request.history.is_empty());
    }
}
