//! Text analysis tool

use crate::error::Result;
use crate::tools::{validators, ResponseBuilder, Tool, ToolArgs};
use async_trait::async_trait;
use serde_json::{json, Value};

const SUPPORTED_KINDS: &[&str] = &[
    "contar_palavras",
    "maiuscula",
    "minuscula",
    "caracteres_total",
    "converter_minusculas",
];

/// Analyzes a text: word counting, case conversion, character totals.
pub struct TextAnalysisTool;

impl TextAnalysisTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextAnalysisTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TextAnalysisTool {
    fn name(&self) -> &str {
        "analisar_texto"
    }

    fn description(&self) -> &str {
        "Analisa um texto de acordo com o tipo especificado (contar_palavras, \
         maiuscula, minuscula, caracteres_total). Input: texto[,tipo_analise]"
    }

    fn validate(&self, args: &ToolArgs) -> bool {
        validators::non_empty_text(&args.get_or::<String>("texto", String::new()))
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value> {
        let texto: String = args.get("texto")?;
        let tipo = args.get_or::<String>("tipo_analise", "contar_palavras".to_string());

        let result = match tipo.as_str() {
            "contar_palavras" => {
                let palavras = texto.split_whitespace().count();
                ResponseBuilder::new("contagem_palavras")
                    .input("texto_analisado", texto.as_str())
                    .result("total_palavras", palavras)
                    .summary(format!("O texto '{}' tem {} palavra(s)", texto, palavras))
                    .build()
            }
            "maiuscula" | "maiúscula" => ResponseBuilder::new("conversao_maiuscula")
                .input("texto_original", texto.as_str())
                .result("texto_convertido", texto.to_uppercase())
                .summary("Texto convertido para maiuscula")
                .build(),
            "minuscula" | "minúscula" | "converter_minusculas" => {
                ResponseBuilder::new("conversao_minuscula")
                    .input("texto_original", texto.as_str())
                    .result("texto_convertido", texto.to_lowercase())
                    .summary("Texto convertido para minuscula")
                    .build()
            }
            "caracteres_total" => {
                let total = texto.chars().count();
                let sem_espaco = texto.chars().filter(|c| *c != ' ').count();
                ResponseBuilder::new("contagem_caracteres_total")
                    .input("texto_analisado", texto.as_str())
                    .result("total_caracteres", total)
                    .result("caracteres_sem_espaco", sem_espaco)
                    .result("espacos", total - sem_espaco)
                    .summary(format!(
                        "O texto tem {} caracteres total ({} sem espacos)",
                        total, sem_espaco
                    ))
                    .build()
            }
            other => json!({
                "error": format!("Tipo de analise '{}' nao suportado", other),
                "tipos_suportados": SUPPORTED_KINDS,
            }),
        };

        Ok(result)
    }
}
