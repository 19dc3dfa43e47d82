//! Keyword-based sentiment classification

use crate::error::Result;
use crate::tools::{validators, ResponseBuilder, Tool, ToolArgs};
use async_trait::async_trait;
use serde_json::Value;

const POSITIVE_WORDS: &[&str] = &[
    "bom", "otimo", "ótimo", "excelente", "maravilhoso", "feliz", "alegre", "amor", "sucesso",
    "positivo",
];

const NEGATIVE_WORDS: &[&str] = &[
    "ruim", "pessimo", "péssimo", "terrivel", "terrível", "horrivel", "horrível", "triste",
    "raiva", "odio", "ódio", "fracasso", "negativo",
];

/// Classifies a text as positive, negative or neutral from keyword counts.
pub struct SentimentTool;

impl SentimentTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SentimentTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SentimentTool {
    fn name(&self) -> &str {
        "analisar_sentimento"
    }

    fn description(&self) -> &str {
        "Analisa o sentimento basico de um texto (positivo, negativo ou neutro). \
         Input: texto"
    }

    fn validate(&self, args: &ToolArgs) -> bool {
        let texto = args.get_or::<String>("texto", String::new());
        validators::non_empty_text(&texto)
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value> {
        let texto: String = args.get("texto")?;
        let lower = texto.to_lowercase();

        let score_positivo = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
        let score_negativo = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();

        let sentimento = if score_positivo > score_negativo {
            "positivo"
        } else if score_negativo > score_positivo {
            "negativo"
        } else {
            "neutro"
        };

        Ok(ResponseBuilder::new("analise_sentimento")
            .input("texto_analisado", texto.as_str())
            .result("sentimento", sentimento)
            .result("score_positivo", score_positivo)
            .result("score_negativo", score_negativo)
            .summary(format!(
                "O texto tem sentimento {} (positivo: {}, negativo: {})",
                sentimento, score_positivo, score_negativo
            ))
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn classify(text: &str) -> Value {
        SentimentTool::new()
            .execute(&ToolArgs::new().with("texto", text))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn positive_text() {
        let result = classify("que dia excelente, estou muito feliz").await;
        assert_eq!(result["sentimento"], "positivo");
    }

    #[tokio::test]
    async fn negative_text() {
        let result = classify("foi um fracasso terrível, estou triste").await;
        assert_eq!(result["sentimento"], "negativo");
        assert_eq!(result["score_negativo"], 3);
    }

    #[tokio::test]
    async fn balanced_text_is_neutral() {
        let result = classify("o dia foi bom mas o transito estava ruim").await;
        assert_eq!(result["sentimento"], "neutro");
    }
}
