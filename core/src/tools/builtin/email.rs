//! Email address extraction

use crate::error::Result;
use crate::tools::{validators, ResponseBuilder, Tool, ToolArgs};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Extracts email addresses from free text with a regex.
pub struct EmailExtractTool;

impl EmailExtractTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmailExtractTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for EmailExtractTool {
    fn name(&self) -> &str {
        "extrair_emails"
    }

    fn description(&self) -> &str {
        "Extrai enderecos de email de um texto. Input: texto"
    }

    fn validate(&self, args: &ToolArgs) -> bool {
        let texto = args.get_or::<String>("texto", String::new());
        validators::non_empty_text(&texto)
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value> {
        let texto: String = args.get("texto")?;

        let emails: Vec<String> = email_regex()
            .find_iter(&texto)
            .map(|m| m.as_str().to_string())
            .collect();

        Ok(ResponseBuilder::new("extracao_emails")
            .input("texto_analisado", texto.as_str())
            .result("emails_encontrados", emails.clone())
            .result("total_emails", emails.len())
            .summary(format!("Foram encontrados {} email(s) no texto", emails.len()))
            .build())
    }
}
