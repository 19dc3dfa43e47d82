//! Runtime configuration for the assistant

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Inference parameters for the underlying LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Model identifier (e.g. "claude-3-5-sonnet-20241022")
    pub model_id: String,

    /// Provider region hint, kept for deployments that route by region
    pub region: String,

    /// API base URL
    pub base_url: String,

    /// API key, resolved from the environment when absent
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens in the response
    pub max_tokens: Option<u32>,

    /// Nucleus sampling parameter
    pub top_p: Option<f32>,

    /// Maximum agent steps per invocation
    pub max_steps: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_id: "claude-3-5-sonnet-20241022".to_string(),
            region: "us-east-1".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            api_key: None,
            temperature: 0.0,
            max_tokens: Some(4096),
            top_p: None,
            max_steps: 10,
        }
    }
}

impl InferenceConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            model_id: std::env::var("VOX_MODEL_ID").unwrap_or(defaults.model_id),
            region: std::env::var("VOX_REGION").unwrap_or(defaults.region),
            base_url: std::env::var("VOX_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("VOX_API_KEY").ok(),
            temperature: std::env::var("VOX_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            max_tokens: std::env::var("VOX_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.max_tokens),
            top_p: std::env::var("VOX_TOP_P").ok().and_then(|v| v.parse().ok()),
            max_steps: std::env::var("VOX_MAX_STEPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_steps),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "model_id".to_string(),
            }
            .into());
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "temperature".to_string(),
                value: self.temperature.to_string(),
            }
            .into());
        }

        if self.max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_steps".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Limits applied when a tool result is summarized before being handed back
/// to the model. The threshold tracks the downstream token budget, which this
/// crate does not own, so both knobs are configurable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryLimits {
    /// Serialized results longer than this are replaced by a summary
    pub max_serialized_len: usize,

    /// Maximum number of array entries kept in a summary
    pub sample_size: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            max_serialized_len: 3000,
            sample_size: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(InferenceConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_model_id_is_rejected() {
        let config = InferenceConfig {
            model_id: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let config = InferenceConfig {
            temperature: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn summary_limits_defaults() {
        let limits = SummaryLimits::default();
        assert_eq!(limits.max_serialized_len, 3000);
        assert_eq!(limits.sample_size, 3);
    }
}
