//! Base tool trait and shared structures

use crate::error::{Result, ToolError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Trait for all tools.
///
/// `invoke` is the call boundary the rest of the system relies on: validation
/// and execution failures are converted into a structured error JSON, so no
/// error ever escapes a tool invocation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Pre-check the arguments. Default accepts everything.
    fn validate(&self, _args: &ToolArgs) -> bool {
        true
    }

    /// Execute the tool with the given arguments
    async fn execute(&self, args: &ToolArgs) -> Result<Value>;

    /// Validate, execute and format. Always returns a JSON string.
    async fn invoke(&self, args: ToolArgs) -> String {
        if !self.validate(&args) {
            return format_error(
                self.name(),
                "Parametros de entrada invalidos",
                Some(json!({ "received": args.as_value() })),
            );
        }

        match self.execute(&args).await {
            Ok(result) => {
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                    tracing::error!("Failed to serialize result from {}: {}", self.name(), e);
                    format_error(self.name(), &e.to_string(), None)
                })
            }
            Err(e) => {
                tracing::error!("Tool {} failed: {}", self.name(), e);
                format_error(self.name(), &e.to_string(), None)
            }
        }
    }
}

fn format_error(tool: &str, details: &str, context: Option<Value>) -> String {
    let mut body = json!({
        "error": format!("Erro na execucao da tool {}", tool),
        "details": details,
        "tool": tool,
    });

    if let (Some(obj), Some(Value::Object(extra))) = (body.as_object_mut(), context) {
        obj.extend(extra);
    }

    serde_json::to_string_pretty(&body).unwrap_or_else(|_| {
        format!("{{\"error\": \"Erro na execucao da tool {}\"}}", tool)
    })
}

/// Argument bag passed to a tool: a JSON object with typed getters.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    /// Create an empty argument bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; non-object values are rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(ToolError::InvalidParameters {
                message: format!("expected a JSON object, got {}", other),
            }
            .into()),
        }
    }

    /// Set an argument, consuming and returning self for chaining
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Get a typed argument by key
    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self.values.get(key).ok_or_else(|| ToolError::InvalidParameters {
            message: format!("Missing parameter: {}", key),
        })?;

        serde_json::from_value(value.clone()).map_err(|_| {
            ToolError::InvalidParameters {
                message: format!("Invalid parameter type for: {}", key),
            }
            .into()
        })
    }

    /// Get a typed argument by key with a default
    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: for<'de> Deserialize<'de>,
    {
        self.get(key).unwrap_or(default)
    }

    /// View the bag as a JSON value
    pub fn as_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// Builder for the uniform tool result shape.
pub struct ResponseBuilder {
    response: Map<String, Value>,
}

impl ResponseBuilder {
    pub fn new(response_type: &str) -> Self {
        let mut response = Map::new();
        response.insert("response_type".to_string(), json!(response_type));
        Self { response }
    }

    /// Record an input field the tool processed
    pub fn input(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.response.insert(key.to_string(), value.into());
        self
    }

    /// Record a result field
    pub fn result(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.response.insert(key.to_string(), value.into());
        self
    }

    /// Record the human-readable summary
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.response.insert("summary".to_string(), json!(summary.into()));
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.response)
    }
}

/// Shared argument validators.
pub mod validators {
    /// A text field must be non-empty after trimming
    pub fn non_empty_text(text: &str) -> bool {
        !text.trim().is_empty()
    }

    /// The value must coerce to a finite number
    pub fn is_number(value: &str) -> bool {
        value.trim().parse::<f64>().map(f64::is_finite).unwrap_or(false)
    }

    /// The value must be one of the allowed symbols
    pub fn one_of(value: &str, allowed: &[&str]) -> bool {
        allowed.contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the text argument back"
        }

        fn validate(&self, args: &ToolArgs) -> bool {
            args.get::<String>("texto")
                .map(|t| validators::non_empty_text(&t))
                .unwrap_or(false)
        }

        async fn execute(&self, args: &ToolArgs) -> Result<Value> {
            let texto: String = args.get("texto")?;
            Ok(ResponseBuilder::new("echo")
                .result("texto", texto.as_str())
                .summary(format!("echoed {} chars", texto.len()))
                .build())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        async fn execute(&self, _args: &ToolArgs) -> Result<Value> {
            Err(ToolError::ExecutionFailed {
                name: "failing".to_string(),
                message: "boom".to_string(),
            }
            .into())
        }
    }

    #[tokio::test]
    async fn invoke_returns_result_json() {
        let out = EchoTool.invoke(ToolArgs::new().with("texto", "ola")).await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["response_type"], "echo");
        assert_eq!(parsed["texto"], "ola");
    }

    #[tokio::test]
    async fn invoke_converts_validation_failure_to_error_json() {
        let out = EchoTool.invoke(ToolArgs::new().with("texto", "  ")).await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert!(parsed.get("error").is_some());
        assert_eq!(parsed["tool"], "echo");
    }

    #[tokio::test]
    async fn invoke_converts_execution_failure_to_error_json() {
        let out = FailingTool.invoke(ToolArgs::new()).await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert!(parsed.get("error").is_some());
        assert!(parsed["details"].as_str().unwrap().contains("boom"));
        assert_eq!(parsed["tool"], "failing");
    }

    #[test]
    fn tool_args_typed_getters() {
        let args = ToolArgs::from_value(json!({"a": 1.5, "b": "x"})).unwrap();
        let a: f64 = args.get("a").unwrap();
        assert_eq!(a, 1.5);
        assert_eq!(args.get_or::<String>("missing", "d".to_string()), "d");
        assert!(args.get::<f64>("b").is_err());
    }

    #[test]
    fn tool_args_rejects_non_object() {
        assert!(ToolArgs::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn validators_cover_common_cases() {
        assert!(validators::non_empty_text("abc"));
        assert!(!validators::non_empty_text("   "));
        assert!(validators::is_number("25"));
        assert!(validators::is_number(" -3.5 "));
        assert!(!validators::is_number("abc"));
        assert!(validators::one_of("*", &["+", "-", "*", "/"]));
        assert!(!validators::one_of("%", &["+", "-", "*", "/"]));
    }
}
