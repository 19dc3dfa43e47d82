//! Basic arithmetic tool

use crate::error::Result;
use crate::tools::{validators, ResponseBuilder, Tool, ToolArgs};
use async_trait::async_trait;
use serde_json::{json, Value};

const OPERATIONS: &[&str] = &["+", "-", "*", "/"];

/// Performs the four basic arithmetic operations.
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculadora_basica"
    }

    fn description(&self) -> &str {
        "Realiza operacoes matematicas basicas (+, -, *, /). \
         Input: operacao,numero1,numero2"
    }

    fn validate(&self, args: &ToolArgs) -> bool {
        let operacao = args.get_or::<String>("operacao", String::new());
        validators::one_of(operacao.trim(), OPERATIONS)
            && args.get::<f64>("numero1").is_ok()
            && args.get::<f64>("numero2").is_ok()
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value> {
        let operacao: String = args.get("operacao")?;
        let numero1: f64 = args.get("numero1")?;
        let numero2: f64 = args.get("numero2")?;

        let resultado = match operacao.trim() {
            "+" => numero1 + numero2,
            "-" => numero1 - numero2,
            "*" => numero1 * numero2,
            "/" => {
                if numero2 == 0.0 {
                    return Ok(json!({
                        "error": "Divisao por zero nao e permitida",
                        "operacao": operacao,
                        "numero1": numero1,
                        "numero2": numero2,
                    }));
                }
                numero1 / numero2
            }
            other => {
                return Ok(json!({
                    "error": format!("Operacao '{}' nao suportada", other),
                    "operacoes_suportadas": OPERATIONS,
                }));
            }
        };

        Ok(ResponseBuilder::new("calculo_matematico")
            .input("operacao", operacao.trim())
            .input("numero1", numero1)
            .input("numero2", numero2)
            .result("resultado", resultado)
            .summary(format!(
                "{} {} {} = {}",
                numero1,
                operacao.trim(),
                numero2,
                resultado
            ))
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn multiplies() {
        let tool = CalculatorTool::new();
        let args = ToolArgs::new()
            .with("operacao", "*")
            .with("numero1", 25.0)
            .with("numero2", 8.0);
        let result = tool.execute(&args).await.unwrap();

        assert_eq!(result["resultado"], 200.0);
    }

    #[tokio::test]
    async fn division_by_zero_is_a_structured_error() {
        let tool = CalculatorTool::new();
        let args = ToolArgs::new()
            .with("operacao", "/")
            .with("numero1", 1.0)
            .with("numero2", 0.0);
        let result = tool.execute(&args).await.unwrap();

        assert!(result.get("error").is_some());
        assert!(result.get("resultado").is_none());
    }

    #[tokio::test]
    async fn unsupported_operation_is_rejected_by_validate() {
        let tool = CalculatorTool::new();
        let args = ToolArgs::new()
            .with("operacao", "%")
            .with("numero1", 1.0)
            .with("numero2", 2.0);
        assert!(!tool.validate(&args));
    }

    #[tokio::test]
    async fn divides() {
        let tool = CalculatorTool::new();
        let args = ToolArgs::new()
            .with("operacao", "/")
            .with("numero1", 9.0)
            .with("numero2", 2.0);
        let result = tool.execute(&args).await.unwrap();

        assert_eq!(result["resultado"], 4.5);
    }
}
