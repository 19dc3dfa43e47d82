//! Character counting tool

use crate::error::Result;
use crate::tools::{validators, ResponseBuilder, Tool, ToolArgs};
use async_trait::async_trait;
use serde_json::Value;

/// Counts how many times a character appears in a text, exact and
/// case-insensitive.
pub struct CharCountTool;

impl CharCountTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CharCountTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CharCountTool {
    fn name(&self) -> &str {
        "contador_caracteres"
    }

    fn description(&self) -> &str {
        "Conta quantas vezes um caracter especifico aparece em um texto. \
         Input: texto,caracter"
    }

    fn validate(&self, args: &ToolArgs) -> bool {
        let texto = args.get_or::<String>("texto", String::new());
        let caracter = args.get_or::<String>("caracter", String::new());
        validators::non_empty_text(&texto) && validators::non_empty_text(&caracter)
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value> {
        let texto: String = args.get("texto")?;
        let caracter: String = args.get("caracter")?;

        let count_exact = texto.matches(&caracter).count();
        let count_upper = texto.matches(&caracter.to_uppercase()).count();
        let count_lower = texto.matches(&caracter.to_lowercase()).count();
        let total_case_insensitive = count_upper + count_lower;

        Ok(ResponseBuilder::new("contagem_caracteres")
            .input("texto_analisado", texto.as_str())
            .input("caracter_procurado", caracter.as_str())
            .result("exato", count_exact)
            .result("maiusculo", count_upper)
            .result("minusculo", count_lower)
            .result("total_case_insensitive", total_case_insensitive)
            .summary(format!(
                "O caractere '{}' aparece {} vez(es) de forma exata no texto '{}'",
                caracter, count_exact, texto
            ))
            .build())
    }
}
