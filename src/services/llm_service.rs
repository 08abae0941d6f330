//! services/llm_service.rs
//! Cliente HTTP para el LLM (OpenRouter o compatible) + decode estricto
//! de la decisión que devuelve el modelo.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::app_config::{AppConfig, LlmConfig};
use crate::models::customer_model::Customer;
use crate::models::email_model::GenerationDecision;

/// Timeout de cada request al LLM.
const LLM_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_PROMPT: &str = "You are a professional B2B sales copywriter. \
Always respond with a single JSON object and nothing else. \
To send an email: {\"decision\": \"email\", \"subject\": \"...\", \"body\": \"...\"}. \
To skip the customer: {\"decision\": \"skip\", \"reason\": \"...\"}. \
To hand the customer to another workflow: {\"decision\": \"route\", \"reason\": \"...\", \"next_step\": \"...\"}.";

pub struct LlmClient {
    http_client: Client,
    api_key: String,
    config: LlmConfig,
    /// Se manda como HTTP-Referer (OpenRouter lo usa para atribución).
    referer: String,
}

impl LlmClient {
    pub fn new(config: &AppConfig, api_key: String) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(LLM_REQUEST_TIMEOUT)
            .build()
            .context("No se pudo construir el cliente HTTP")?;

        Ok(LlmClient {
            http_client,
            api_key,
            config: config.llm.clone(),
            referer: config.company.website.clone(),
        })
    }

    /// Llama al endpoint de chat-completions y decodifica la decisión.
    pub async fn generate(&self, customer: &Customer, prompt: &str) -> Result<GenerationDecision> {
        log::info!(
            "(generate) Calling LLM for {} (model: {})",
            customer.email,
            self.config.model
        );

        let mut body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.7,
            "max_tokens": 5000,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "campaign_decision",
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "decision": { "type": "string", "enum": ["email", "skip", "route"] },
                            "subject": { "type": "string" },
                            "body": { "type": "string" },
                            "reason": { "type": "string" },
                            "next_step": { "type": "string" }
                        },
                        "required": ["decision"],
                        "additionalProperties": false
                    }
                }
            }
        });

        if self.config.enable_web_search {
            body["plugins"] = json!([{ "id": "web" }]);
        }

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", self.referer.as_str())
            .header("X-Title", "Email Loop CLI")
            .json(&body)
            .send()
            .await
            .context("Fallo el request al LLM")?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            bail!("LLM request failed with status {}: {}", status, body_text);
        }

        let payload: Value = resp
            .json()
            .await
            .context("La respuesta del LLM no es JSON")?;

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Empty response from LLM"))?;

        self.decode_decision(content)
    }

    /// Decode estricto. Si falla y repair_truncated está activo, se intenta
    /// cerrar el payload truncado UNA vez antes de rendirse.
    fn decode_decision(&self, content: &str) -> Result<GenerationDecision> {
        match serde_json::from_str::<GenerationDecision>(content.trim()) {
            Ok(decision) => Ok(decision),
            Err(first_err) => {
                if self.config.repair_truncated {
                    if let Some(repaired) = repair_truncated_json(content) {
                        log::warn!("LLM payload failed strict decode, retrying after repair");
                        if let Ok(decision) = serde_json::from_str::<GenerationDecision>(&repaired)
                        {
                            return Ok(decision);
                        }
                    }
                }
                Err(anyhow!("LLM payload failed strict decode: {}", first_err))
            }
        }
    }
}

/// Mejor esfuerzo para un JSON cortado a mitad: cierra la string abierta
/// (si la hay) y balancea las llaves. No arregla nada más elaborado.
pub(crate) fn repair_truncated_json(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if !trimmed.starts_with('{') || trimmed.ends_with('}') {
        return None;
    }

    let mut in_string = false;
    let mut escaped = false;
    let mut depth: usize = 0;
    for ch in trimmed.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    let mut repaired = trimmed.to_string();
    if in_string {
        repaired.push('"');
    }
    for _ in 0..depth {
        repaired.push('}');
    }
    Some(repaired)
}
