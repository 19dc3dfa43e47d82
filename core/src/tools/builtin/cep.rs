//! Brazilian postal code (CEP) lookup over two public APIs

use crate::error::Result;
use crate::tools::{validators, ResponseBuilder, Tool, ToolArgs};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{info, warn};

const VIACEP_BASE: &str = "https://viacep.com.br/ws";
const CEPABERTO_BASE: &str = "https://www.cepaberto.com/api/v3/cep";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
const USER_AGENT: &str = "vox-agent/0.1";

/// Looks up a Brazilian address by CEP.
///
/// ViaCEP is the authoritative source; CEP Aberto is queried as a second
/// source for geographic coordinates and its fields never override ViaCEP's.
pub struct CepLookupTool {
    client: reqwest::Client,
    viacep_base: String,
    cepaberto_base: String,
}

impl CepLookupTool {
    pub fn new() -> Self {
        Self::with_base_urls(VIACEP_BASE, CEPABERTO_BASE)
    }

    /// Overrides the upstream endpoints, used by tests.
    pub fn with_base_urls(viacep_base: impl Into<String>, cepaberto_base: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            viacep_base: viacep_base.into(),
            cepaberto_base: cepaberto_base.into(),
        }
    }

    fn clean_cep(cep: &str) -> String {
        cep.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    fn format_cep(clean: &str) -> String {
        format!("{}-{}", &clean[..5], &clean[5..])
    }

    async fn query_viacep(&self, cep: &str) -> Option<Map<String, Value>> {
        let url = format!("{}/{}/json/", self.viacep_base, cep);
        info!(url = %url, "consulting ViaCEP");

        let data: Value = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => resp.json().await.ok()?,
            Ok(resp) => {
                warn!(status = %resp.status(), "ViaCEP returned an error status");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "ViaCEP request failed");
                return None;
            }
        };

        // ViaCEP signals an unknown CEP with {"erro": true} and status 200.
        if data.get("erro").is_some() {
            return None;
        }

        let field = |key: &str| data.get(key).and_then(Value::as_str).unwrap_or("").to_string();
        let mut out = Map::new();
        out.insert("fonte".into(), json!("ViaCEP"));
        out.insert("cep".into(), json!(field("cep")));
        out.insert("logradouro".into(), json!(field("logradouro")));
        out.insert("complemento".into(), json!(field("complemento")));
        out.insert("bairro".into(), json!(field("bairro")));
        out.insert("cidade".into(), json!(field("localidade")));
        out.insert("uf".into(), json!(field("uf")));
        out.insert("ibge".into(), json!(field("ibge")));
        out.insert("ddd".into(), json!(field("ddd")));
        out.insert("siafi".into(), json!(field("siafi")));
        Some(out)
    }

    async fn query_cepaberto(&self, cep: &str) -> Option<Map<String, Value>> {
        let url = format!("{}?cep={}", self.cepaberto_base, cep);
        info!(url = %url, "consulting CEP Aberto");

        let data: Value = match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => resp.json().await.ok()?,
            Ok(resp) => {
                warn!(status = %resp.status(), "CEP Aberto returned an error status");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "CEP Aberto request failed");
                return None;
            }
        };

        let mut out = Map::new();
        out.insert("fonte".into(), json!("CEP Aberto"));
        out.insert(
            "latitude".into(),
            data.get("latitude").cloned().unwrap_or(json!("")),
        );
        out.insert(
            "longitude".into(),
            data.get("longitude").cloned().unwrap_or(json!("")),
        );
        out.insert(
            "altitude".into(),
            data.get("altitude").cloned().unwrap_or(json!("")),
        );
        Some(out)
    }

    /// Merges the per-source payloads, ViaCEP fields taking precedence.
    fn merge_sources(
        viacep: &Map<String, Value>,
        cepaberto: Option<&Map<String, Value>>,
        cep_formatado: &str,
    ) -> Value {
        let field = |key: &str| {
            viacep
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };

        let logradouro = field("logradouro");
        let bairro = field("bairro");
        let cidade = field("cidade");
        let uf = field("uf");

        let endereco_completo = [&logradouro, &bairro, &cidade, &uf]
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut coordenadas = Map::new();
        if let Some(extras) = cepaberto {
            let has = |key: &str| {
                extras
                    .get(key)
                    .map(|v| !v.is_null() && v != &json!(""))
                    .unwrap_or(false)
            };
            if has("latitude") && has("longitude") {
                coordenadas.insert("latitude".into(), extras["latitude"].clone());
                coordenadas.insert("longitude".into(), extras["longitude"].clone());
                coordenadas.insert(
                    "altitude".into(),
                    extras.get("altitude").cloned().unwrap_or(json!("")),
                );
            }
        }

        let mut codigos_oficiais = Map::new();
        for key in ["ibge", "siafi"] {
            let value = field(key);
            if !value.is_empty() {
                codigos_oficiais.insert(key.into(), json!(value));
            }
        }

        json!({
            "cep": cep_formatado,
            "logradouro": logradouro,
            "complemento": field("complemento"),
            "bairro": bairro,
            "cidade": cidade,
            "uf": uf,
            "ddd": field("ddd"),
            "endereco_completo": endereco_completo,
            "coordenadas": coordenadas,
            "codigos_oficiais": codigos_oficiais,
        })
    }
}

impl Default for CepLookupTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CepLookupTool {
    fn name(&self) -> &str {
        "consulta_endereco_por_cep"
    }

    fn description(&self) -> &str {
        "Consulta endereco completo por CEP brasileiro usando multiplas APIs \
         (ViaCEP + CEP Aberto). Input: cep"
    }

    fn validate(&self, args: &ToolArgs) -> bool {
        let cep = args.get_or::<String>("cep", String::new());
        if !validators::non_empty_text(&cep) {
            return false;
        }
        let clean = Self::clean_cep(&cep);
        clean.len() == 8
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value> {
        let cep: String = args.get("cep")?;
        let clean = Self::clean_cep(&cep);
        let cep_formatado = Self::format_cep(&clean);
        let usar_multiplas_apis = args.get_or("usar_multiplas_apis", true);

        let viacep = self.query_viacep(&clean).await;
        let Some(viacep) = viacep else {
            return Ok(json!({
                "error": format!("CEP {} nao encontrado em nenhuma API", cep_formatado),
                "cep": cep_formatado,
            }));
        };

        let cepaberto = if usar_multiplas_apis {
            self.query_cepaberto(&clean).await
        } else {
            None
        };

        let mut apis_utilizadas = vec!["viacep"];
        if cepaberto.is_some() {
            apis_utilizadas.push("cepaberto");
        }

        let endereco = Self::merge_sources(&viacep, cepaberto.as_ref(), &cep_formatado);
        let endereco_completo = endereco["endereco_completo"]
            .as_str()
            .unwrap_or("N/A")
            .to_string();

        Ok(ResponseBuilder::new("consulta_endereco_por_cep")
            .input("cep_original", cep.as_str())
            .input("cep_formatado", cep_formatado.as_str())
            .input("apis_utilizadas", apis_utilizadas.clone())
            .result("endereco", endereco)
            .result("total_apis_consultadas", apis_utilizadas.len())
            .summary(format!("CEP {} encontrado: {}", cep_formatado, endereco_completo))
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viacep_payload() -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("cep".into(), json!("01310-100"));
        m.insert("logradouro".into(), json!("Avenida Paulista"));
        m.insert("complemento".into(), json!(""));
        m.insert("bairro".into(), json!("Bela Vista"));
        m.insert("cidade".into(), json!("São Paulo"));
        m.insert("uf".into(), json!("SP"));
        m.insert("ibge".into(), json!("3550308"));
        m.insert("ddd".into(), json!("11"));
        m.insert("siafi".into(), json!("7107"));
        m
    }

    #[test]
    fn validate_accepts_formatted_and_bare_ceps() {
        let tool = CepLookupTool::new();
        assert!(tool.validate(&ToolArgs::new().with("cep", "01310-100")));
        assert!(tool.validate(&ToolArgs::new().with("cep", "01310100")));
        assert!(!tool.validate(&ToolArgs::new().with("cep", "0131010")));
        assert!(!tool.validate(&ToolArgs::new().with("cep", "abcdefgh")));
    }

    #[test]
    fn merge_builds_the_full_address_from_the_primary_source() {
        let merged = CepLookupTool::merge_sources(&viacep_payload(), None, "01310-100");

        assert_eq!(
            merged["endereco_completo"],
            "Avenida Paulista, Bela Vista, São Paulo, SP"
        );
        assert_eq!(merged["codigos_oficiais"]["ibge"], "3550308");
        assert!(merged["coordenadas"].as_object().unwrap().is_empty());
    }

    #[test]
    fn merge_keeps_primary_fields_and_only_adds_coordinates() {
        let mut extras = Map::new();
        extras.insert("latitude".into(), json!("-23.5613"));
        extras.insert("longitude".into(), json!("-46.6565"));
        extras.insert("altitude".into(), json!(760.0));

        let merged = CepLookupTool::merge_sources(&viacep_payload(), Some(&extras), "01310-100");

        assert_eq!(merged["cidade"], "São Paulo");
        assert_eq!(merged["coordenadas"]["latitude"], "-23.5613");
        assert_eq!(merged["coordenadas"]["altitude"], 760.0);
    }

    #[test]
    fn merge_skips_incomplete_coordinates() {
        let mut extras = Map::new();
        extras.insert("latitude".into(), json!("-23.5613"));
        extras.insert("longitude".into(), json!(""));

        let merged = CepLookupTool::merge_sources(&viacep_payload(), Some(&extras), "01310-100");

        assert!(merged["coordenadas"].as_object().unwrap().is_empty());
    }
}
