//! Single-string adapters over the tool contract
//!
//! The agent framework hands every tool exactly one string. Each tool has a
//! small comma-separated grammar for unpacking that string into named
//! arguments; unrecognized tools get the raw input passed through.

use crate::config::SummaryLimits;
use crate::llm::ToolDefinition;
use crate::tools::{Tool, ToolArgs};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Instructional message returned to the model when an input does not
/// match the tool's grammar.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ParseError(String);

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Grammar for unpacking the single input string of one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputParser {
    /// `texto,caracter`; a missing character becomes the empty string.
    CharCount,
    /// `operacao,numero1,numero2`, exactly three parts.
    Calculator,
    /// `texto[,tipo_analise]`.
    TextAnalysis,
    /// `texto[,algoritmo]`.
    Hash,
    /// Whole trimmed input bound to one named field.
    SingleField(&'static str),
    /// JSON object spread as named arguments, else one named field.
    JsonOrField(&'static str),
    /// Raw input under `input`, for tools with no registered grammar.
    Passthrough,
}

impl InputParser {
    /// Static dispatch table keyed by tool name.
    pub fn for_tool(name: &str) -> Self {
        match name {
            "contador_caracteres" => Self::CharCount,
            "calculadora_basica" => Self::Calculator,
            "analisar_texto" => Self::TextAnalysis,
            "gerar_hash" => Self::Hash,
            "consulta_endereco_por_cep" => Self::SingleField("cep"),
            "analisar_sentimento" | "extrair_emails" => Self::SingleField("texto"),
            "consulta_informacoes_pais" => Self::JsonOrField("nome_pais"),
            _ => Self::Passthrough,
        }
    }

    pub fn parse(&self, input: &str) -> Result<ToolArgs, ParseError> {
        match self {
            Self::CharCount => {
                let args = match input.split_once(',') {
                    Some((texto, caracter)) => ToolArgs::new()
                        .with("texto", texto.trim())
                        .with("caracter", caracter.trim()),
                    None => ToolArgs::new().with("texto", input).with("caracter", ""),
                };
                Ok(args)
            }
            Self::Calculator => {
                let parts: Vec<&str> = input.split(',').collect();
                if parts.len() != 3 {
                    return Err(ParseError::new(
                        "Formato: operacao,numero1,numero2 (ex: *,25,8)",
                    ));
                }
                let numero1: f64 = parts[1].trim().parse().map_err(|_| {
                    ParseError::new("Erro: Numeros invalidos. Formato: operacao,numero1,numero2")
                })?;
                let numero2: f64 = parts[2].trim().parse().map_err(|_| {
                    ParseError::new("Erro: Numeros invalidos. Formato: operacao,numero1,numero2")
                })?;
                Ok(ToolArgs::new()
                    .with("operacao", parts[0].trim())
                    .with("numero1", numero1)
                    .with("numero2", numero2))
            }
            Self::TextAnalysis => {
                let args = match input.split_once(',') {
                    Some((texto, tipo)) => ToolArgs::new()
                        .with("texto", texto.trim())
                        .with("tipo_analise", tipo.trim()),
                    None => ToolArgs::new().with("texto", input),
                };
                Ok(args)
            }
            Self::Hash => {
                let args = match input.split_once(',') {
                    Some((texto, algoritmo)) => ToolArgs::new()
                        .with("texto", texto.trim())
                        .with("algoritmo", algoritmo.trim()),
                    None => ToolArgs::new().with("texto", input),
                };
                Ok(args)
            }
            Self::SingleField(field) => Ok(ToolArgs::new().with(field, input.trim())),
            Self::JsonOrField(field) => {
                let trimmed = input.trim();
                if trimmed.starts_with('{') {
                    let value: Value = serde_json::from_str(trimmed).map_err(|_| {
                        ParseError::new(format!(
                            "Erro: JSON invalido. Formato: {{\"{}\": ...}} ou texto simples",
                            field
                        ))
                    })?;
                    ToolArgs::from_value(value).map_err(|_| {
                        ParseError::new(format!(
                            "Erro: JSON invalido. Formato: {{\"{}\": ...}} ou texto simples",
                            field
                        ))
                    })
                } else {
                    Ok(ToolArgs::new().with(field, trimmed))
                }
            }
            Self::Passthrough => Ok(ToolArgs::new().with("input", input)),
        }
    }
}

/// A tool adapted to the one-string calling convention.
///
/// `call` cannot fail: grammar mismatches return the instructional message
/// and execution failures are already absorbed by the tool boundary.
pub struct WrappedTool {
    tool: Arc<dyn Tool>,
    parser: InputParser,
    limits: SummaryLimits,
}

impl WrappedTool {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self::with_limits(tool, SummaryLimits::default())
    }

    pub fn with_limits(tool: Arc<dyn Tool>, limits: SummaryLimits) -> Self {
        let parser = InputParser::for_tool(tool.name());
        Self { tool, parser, limits }
    }

    pub fn name(&self) -> &str {
        self.tool.name()
    }

    pub fn description(&self) -> &str {
        self.tool.description()
    }

    pub fn parser(&self) -> InputParser {
        self.parser
    }

    /// Single-string tool definition advertised to the model.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Tool input as a single string",
                    }
                },
                "required": ["input"],
            }),
        }
    }

    pub async fn call(&self, input: &str) -> String {
        let args = match self.parser.parse(input) {
            Ok(args) => args,
            Err(err) => return err.to_string(),
        };

        let output = self.tool.invoke(args).await;

        match serde_json::from_str::<Value>(&output) {
            Ok(value) => {
                let value = summarize_if_large(value, &self.limits);
                serde_json::to_string_pretty(&value).unwrap_or(output)
            }
            Err(_) => output,
        }
    }
}

/// Wraps every tool in the list with the given summary limits.
pub fn wrap_all(tools: Vec<Arc<dyn Tool>>, limits: SummaryLimits) -> Vec<WrappedTool> {
    tools
        .into_iter()
        .map(|tool| WrappedTool::with_limits(tool, limits))
        .collect()
}

/// Replaces oversized results with a projection: scalar fields kept, arrays
/// cut to the sample size with a companion total count.
fn summarize_if_large(value: Value, limits: &SummaryLimits) -> Value {
    let serialized_len = value.to_string().len();
    if serialized_len <= limits.max_serialized_len {
        return value;
    }

    let Value::Object(map) = value else {
        return value;
    };

    warn!(
        serialized_len,
        max = limits.max_serialized_len,
        "tool result exceeds the serialization limit, summarizing"
    );

    let mut summary = Map::new();
    for (key, field) in map {
        match field {
            Value::Array(items) => {
                let total = items.len();
                let sample: Vec<Value> = items.into_iter().take(limits.sample_size).collect();
                summary.insert(format!("total_{}", key), json!(total));
                summary.insert(key, Value::Array(sample));
            }
            Value::Object(_) => {
                summary.insert(key, field);
            }
            scalar => {
                summary.insert(key, scalar);
            }
        }
    }
    Value::Object(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::tools::builtin::{CalculatorTool, CharCountTool};
    use async_trait::async_trait;

    #[tokio::test]
    async fn calculator_round_trip() {
        let wrapped = WrappedTool::new(Arc::new(CalculatorTool::new()));
        let output = wrapped.call("*,25,8").await;

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["resultado"], 200.0);
    }

    #[tokio::test]
    async fn calculator_wrong_arity_returns_the_format_hint() {
        let wrapped = WrappedTool::new(Arc::new(CalculatorTool::new()));
        let output = wrapped.call("*,25").await;

        assert!(output.contains("Formato"));
        assert!(serde_json::from_str::<Value>(&output).is_err());
    }

    #[tokio::test]
    async fn calculator_bad_numbers_return_the_format_hint() {
        let wrapped = WrappedTool::new(Arc::new(CalculatorTool::new()));
        let output = wrapped.call("*,vinte,8").await;

        assert!(output.contains("Formato"));
    }

    #[tokio::test]
    async fn char_count_splits_on_the_first_comma() {
        let wrapped = WrappedTool::new(Arc::new(CharCountTool::new()));
        let output = wrapped.call("elephant,e").await;

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["exato"], 2);
    }

    #[test]
    fn unknown_tools_fall_back_to_passthrough() {
        assert_eq!(InputParser::for_tool("ferramenta_nova"), InputParser::Passthrough);
        let args = InputParser::Passthrough.parse("qualquer coisa").unwrap();
        assert_eq!(args.get::<String>("input").unwrap(), "qualquer coisa");
    }

    #[test]
    fn json_or_field_spreads_objects_and_binds_plain_text() {
        let parser = InputParser::for_tool("consulta_informacoes_pais");

        let args = parser.parse(r#"{"nome_pais": "Brazil", "incluir_dados_economicos": false}"#).unwrap();
        assert_eq!(args.get::<String>("nome_pais").unwrap(), "Brazil");
        assert!(!args.get::<bool>("incluir_dados_economicos").unwrap());

        let args = parser.parse("Brazil").unwrap();
        assert_eq!(args.get::<String>("nome_pais").unwrap(), "Brazil");

        assert!(parser.parse("{nome_pais: sem aspas").is_err());
    }

    struct BulkTool;

    #[async_trait]
    impl Tool for BulkTool {
        fn name(&self) -> &str {
            "listagem_em_massa"
        }

        fn description(&self) -> &str {
            "Returns a large item list"
        }

        async fn execute(&self, _args: &ToolArgs) -> Result<Value> {
            let items: Vec<Value> = (0..200)
                .map(|i| json!({"id": i, "descricao": format!("item numero {}", i)}))
                .collect();
            Ok(json!({"status": "ok", "itens": items}))
        }
    }

    #[tokio::test]
    async fn oversized_results_are_summarized_to_the_sample_size() {
        let limits = SummaryLimits {
            max_serialized_len: 500,
            sample_size: 3,
        };
        let wrapped = WrappedTool::with_limits(Arc::new(BulkTool), limits);
        let output = wrapped.call("tudo").await;

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["total_itens"], 200);
        assert_eq!(value["itens"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn small_results_pass_through_unchanged() {
        let wrapped = WrappedTool::new(Arc::new(CalculatorTool::new()));
        let output = wrapped.call("+,1,2").await;

        let value: Value = serde_json::from_str(&output).unwrap();
        assert!(value.get("total_resultado").is_none());
        assert_eq!(value["resultado"], 3.0);
    }
}
