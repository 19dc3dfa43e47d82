//! Speech synthesis seam
//!
//! Audio generation belongs to an external collaborator; this module only
//! defines the contract and the text preparation applied before any
//! synthesizer sees the input.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum text length a synthesizer receives.
pub const SYNTHESIS_TEXT_LIMIT: usize = 3000;
/// Oversized text is cut here before the ellipsis is appended.
const SYNTHESIS_TRUNCATE_AT: usize = 2900;

/// Parameters for one synthesis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub output_format: String,
    /// Prosody rate: "x-slow", "slow", "medium", "fast" or "x-fast".
    pub speed: String,
    pub use_neural: bool,
}

impl Default for SynthesisRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            voice_id: "Joanna".to_string(),
            output_format: "mp3".to_string(),
            speed: "medium".to_string(),
            use_neural: true,
        }
    }
}

impl SynthesisRequest {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Outcome of a synthesis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub success: bool,
    pub file_path: Option<String>,
    /// Estimated duration in seconds.
    pub duration: Option<f64>,
    pub voice_id: String,
    pub output_format: String,
    pub created_at: DateTime<Utc>,
    pub error: Option<String>,
}

/// External audio collaborator.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult>;
}

/// Cuts oversized text to the synthesizer limit, marking the cut.
pub fn prepare_text(text: &str) -> String {
    if text.chars().count() <= SYNTHESIS_TEXT_LIMIT {
        return text.to_string();
    }
    let truncated: String = text.chars().take(SYNTHESIS_TRUNCATE_AT).collect();
    format!("{}...", truncated)
}

/// Synthesizer for audio-less runs: reports success with no file.
pub struct NullSynthesizer;

#[async_trait]
impl SpeechSynthesizer for NullSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult> {
        Ok(SynthesisResult {
            success: true,
            file_path: None,
            duration: None,
            voice_id: request.voice_id,
            output_format: request.output_format,
            created_at: Utc::now(),
            error: None,
        })
    }
}
