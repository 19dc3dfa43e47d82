//! Country information lookup over the REST Countries API

use crate::error::Result;
use crate::tools::{validators, ResponseBuilder, Tool, ToolArgs};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{info, warn};

const RESTCOUNTRIES_BASE: &str = "https://restcountries.com/v3.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "vox-agent/0.1";

/// Fetches basic and economic country data from REST Countries v3.1.
///
/// Lookup tries the name route first and falls back to the alpha-code
/// route, so both "Brazil" and "BR" resolve. Economic data comes from a
/// second, field-filtered request keyed by the ISO alpha-2 code.
pub struct CountryInfoTool {
    client: reqwest::Client,
    base_url: String,
}

impl CountryInfoTool {
    pub fn new() -> Self {
        Self::with_base_url(RESTCOUNTRIES_BASE)
    }

    /// Overrides the upstream endpoint, used by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_basic(&self, name: &str) -> Option<Value> {
        for route in ["name", "alpha"] {
            let url = format!("{}/{}/{}", self.base_url, route, name);
            info!(url = %url, "consulting country data");

            let response = match self
                .client
                .get(&url)
                .query(&[("fullText", "true")])
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    warn!(route, error = %err, "country request failed");
                    continue;
                }
            };
            if !response.status().is_success() {
                continue;
            }
            let data: Value = match response.json().await {
                Ok(v) => v,
                Err(_) => continue,
            };
            if let Some(first) = data.as_array().and_then(|a| a.first()) {
                return Some(Self::process_basic(first));
            }
        }
        None
    }

    async fn fetch_economic(&self, alpha2: &str) -> Option<Value> {
        let url = format!("{}/alpha/{}", self.base_url, alpha2);
        info!(url = %url, "consulting economic data");

        let response = match self
            .client
            .get(&url)
            .query(&[("fields", "currencies,gini")])
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!(status = %resp.status(), "economic route returned an error status");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "economic request failed");
                return None;
            }
        };

        let data: Value = response.json().await.ok()?;
        let entry = match &data {
            Value::Array(items) => items.first()?,
            other => other,
        };
        Some(Self::process_economic(entry))
    }

    /// Flattens the raw country entry into the summary fields we expose.
    fn process_basic(raw: &Value) -> Value {
        let str_at = |path: &[&str]| -> String {
            let mut cur = raw;
            for key in path {
                cur = match cur.get(key) {
                    Some(v) => v,
                    None => return "N/A".to_string(),
                };
            }
            cur.as_str().unwrap_or("N/A").to_string()
        };
        let first_of = |key: &str| {
            raw.get(key)
                .and_then(Value::as_array)
                .and_then(|a| a.first())
                .and_then(Value::as_str)
                .unwrap_or("N/A")
                .to_string()
        };

        let populacao = raw.get("population").and_then(Value::as_u64).unwrap_or(0);
        let area_km2 = raw.get("area").and_then(Value::as_f64).unwrap_or(0.0);
        let densidade = if populacao > 0 && area_km2 > 0.0 {
            (populacao as f64 / area_km2 * 100.0).round() / 100.0
        } else {
            0.0
        };

        let idiomas: Vec<String> = raw
            .get("languages")
            .and_then(Value::as_object)
            .map(|m| {
                m.values()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let idd = raw.get("idd");
        let codigo_telefone = format!(
            "{}{}",
            idd.and_then(|i| i.get("root")).and_then(Value::as_str).unwrap_or(""),
            idd.and_then(|i| i.get("suffixes"))
                .and_then(Value::as_array)
                .and_then(|s| s.first())
                .and_then(Value::as_str)
                .unwrap_or("")
        );

        json!({
            "nome_comum": str_at(&["name", "common"]),
            "nome_oficial": str_at(&["name", "official"]),
            "codigo_iso2": str_at(&["cca2"]),
            "codigo_iso3": str_at(&["cca3"]),
            "capital": first_of("capital"),
            "regiao": str_at(&["region"]),
            "sub_regiao": str_at(&["subregion"]),
            "populacao": populacao,
            "area_km2": area_km2,
            "densidade_populacional": densidade,
            "idiomas": idiomas,
            "fuso_horario": first_of("timezones"),
            "codigo_telefone": codigo_telefone,
            "independente": raw.get("independent").and_then(Value::as_bool).unwrap_or(false),
            "membro_onu": raw.get("unMember").and_then(Value::as_bool).unwrap_or(false),
            "bandeira": str_at(&["flags", "png"]),
            "mapa": str_at(&["maps", "googleMaps"]),
        })
    }

    fn process_economic(raw: &Value) -> Value {
        let mut moedas = Map::new();
        if let Some(currencies) = raw.get("currencies").and_then(Value::as_object) {
            for (code, info) in currencies {
                moedas.insert(
                    code.clone(),
                    json!({
                        "nome": info.get("name").and_then(Value::as_str).unwrap_or("N/A"),
                        "simbolo": info.get("symbol").and_then(Value::as_str).unwrap_or("N/A"),
                    }),
                );
            }
        }

        let mut indicadores = Map::new();
        if let Some(gini) = raw.get("gini").and_then(Value::as_object) {
            // Years arrive as object keys; take the most recent one.
            if let Some(latest) = gini.keys().max().cloned() {
                indicadores.insert(
                    "gini".into(),
                    json!({
                        "valor": gini[&latest],
                        "ano": latest,
                        "descricao": "Indice GINI (desigualdade de renda)",
                    }),
                );
            }
        }

        json!({
            "moedas": moedas,
            "indicadores_economicos": indicadores,
        })
    }

    /// Condenses both routes into the executive summary block.
    fn executive_summary(basico: &Value, economico: Option<&Value>) -> Value {
        let populacao = basico["populacao"].as_u64().unwrap_or(0);
        let area = basico["area_km2"].as_f64().unwrap_or(0.0);
        let idiomas: Vec<Value> = basico["idiomas"]
            .as_array()
            .map(|a| a.iter().take(3).cloned().collect())
            .unwrap_or_default();

        let mut resumo = json!({
            "pais": basico["nome_oficial"],
            "codigo": basico["codigo_iso2"],
            "capital": basico["capital"],
            "populacao_milhoes": (populacao as f64 / 1_000_000.0 * 100.0).round() / 100.0,
            "area_mil_km2": (area / 1_000.0 * 100.0).round() / 100.0,
            "densidade_hab_km2": basico["densidade_populacional"],
            "regiao": format!(
                "{} - {}",
                basico["regiao"].as_str().unwrap_or("N/A"),
                basico["sub_regiao"].as_str().unwrap_or("N/A")
            ),
            "idiomas_principais": idiomas,
            "independente": basico["independente"],
            "membro_onu": basico["membro_onu"],
        });

        if let Some(eco) = economico {
            if let Some(moedas) = eco["moedas"].as_object() {
                if !moedas.is_empty() {
                    let codes: Vec<&String> = moedas.keys().take(2).collect();
                    resumo["moedas"] = json!(codes);
                }
            }
            if let Some(gini) = eco["indicadores_economicos"].get("gini") {
                resumo["desigualdade_gini"] = json!(format!(
                    "{} ({})",
                    gini["valor"],
                    gini["ano"].as_str().unwrap_or("N/A")
                ));
            }
        }

        resumo
    }
}

impl Default for CountryInfoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CountryInfoTool {
    fn name(&self) -> &str {
        "consulta_informacoes_pais"
    }

    fn description(&self) -> &str {
        "Consulta informacoes detalhadas de paises (dados basicos + economicos) \
         usando a REST Countries API. Input: nome_pais"
    }

    fn validate(&self, args: &ToolArgs) -> bool {
        let nome = args.get_or::<String>("nome_pais", String::new());
        validators::non_empty_text(&nome) && nome.trim().len() >= 2
    }

    async fn execute(&self, args: &ToolArgs) -> Result<Value> {
        let nome_pais: String = args.get("nome_pais")?;
        let incluir_dados_economicos = args.get_or("incluir_dados_economicos", true);

        let Some(basico) = self.fetch_basic(nome_pais.trim()).await else {
            return Ok(json!({
                "error": format!("Pais '{}' nao encontrado", nome_pais),
            }));
        };

        let codigo_pais = basico["codigo_iso2"].as_str().unwrap_or("").to_string();
        let economico = if incluir_dados_economicos && !codigo_pais.is_empty() && codigo_pais != "N/A"
        {
            self.fetch_economic(&codigo_pais).await
        } else {
            None
        };

        let rotas_consultadas = if economico.is_some() { 2 } else { 1 };
        let resumo = Self::executive_summary(&basico, economico.as_ref());
        let nome_oficial = basico["nome_oficial"]
            .as_str()
            .unwrap_or(&nome_pais)
            .to_string();

        Ok(ResponseBuilder::new("consulta_informacoes_pais")
            .input("pais_consultado", nome_pais.as_str())
            .input("incluiu_dados_economicos", incluir_dados_economicos)
            .input("codigo_pais", codigo_pais.as_str())
            .result(
                "dados_pais",
                json!({
                    "informacoes_basicas": basico,
                    "informacoes_economicas": economico.unwrap_or_else(|| json!({})),
                    "resumo_executivo": resumo,
                }),
            )
            .result("rotas_consultadas", rotas_consultadas)
            .result("api_utilizada", "REST Countries v3.1")
            .summary(format!("Informacoes de {} coletadas com sucesso", nome_oficial))
            .build())
    }
}
