//! Cryptographic digest tool

use crate::error::Result;
use crate::tools::{validators, ResponseBuilder, Tool, ToolArgs};
use async_trait::async_trait;
use md5::Md5;
use serde_json::{json, Value};
use sha1::Sha1;
use sha2::{Digest, Sha256};

const ALGORITHMS: &[&str] = &["md5", "sha1", "sha256"];

/// Computes hex-encoded digests of a text with a selectable algorithm.
pub struct HashTool;

impl HashTool {
    pub fn new() -> Self {
        Self
    }

    fn digest(algorithm: &str, text: &str) -> Option<String> {
        let bytes = text.as_bytes();
        match algorithm {
            "md5" => Some(hex::encode(Md5::digest(bytes))),
            "sha1" => Some(hex::encode(Sha1::digest(bytes))),
            "sha256" => Some(hex::encode(Sha256::digest(bytes))),
            _ => None,
        }
    }
}

impl Default for HashTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for HashTool {
    fn name(&self) -> &str {
        "gerar_hash"
    }

    fn description(&self) -> &str {
        "Gera o hash de um texto usando md5, sha1 ou sha256. \
         Input: texto,algoritmo"
    }

    fn validate(&self, args: &ToolArgs) -> bool {
        let texto = args.get_or::<String>("texto", String::new());
        validators::non_empty_text(&texto)
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value> {
        let texto: String = args.get("texto")?;
        let algoritmo = args
            .get_or::<String>("algoritmo", "md5".to_string())
            .trim()
            .to_lowercase();

        match Self::digest(&algoritmo, &texto) {
            Some(hash) => Ok(ResponseBuilder::new("hash_gerado")
                .input("texto", texto.as_str())
                .input("algoritmo", algoritmo.as_str())
                .result("hash", hash.as_str())
                .result("tamanho_hex", hash.len())
                .summary(format!("Hash {} gerado com {} caracteres", algoritmo, hash.len()))
                .build()),
            None => Ok(json!({
                "error": format!("Algoritmo '{}' nao suportado", algoritmo),
                "algoritmos_suportados": ALGORITHMS,
            })),
        }
    }
}
