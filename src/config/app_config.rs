//! config/app_config.rs
//! Configuración global de la aplicación (config/app.config.json + variables .env)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config del cliente LLM (OpenRouter o cualquier endpoint compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Activa el plugin de búsqueda web de OpenRouter.
    #[serde(default)]
    pub enable_web_search: bool,
    /// Intenta cerrar payloads JSON truncados antes de rendirse.
    /// Apagado por defecto; el decode normal es estricto.
    #[serde(default)]
    pub repair_truncated: bool,
}

/// Ritmo de envío entre clientes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Delay base entre correos, en ms (la CLI lo puede pisar con --delay).
    #[serde(default = "default_delay_between_emails")]
    pub delay_between_emails: u64,
}

fn default_delay_between_emails() -> u64 {
    2000
}

/// Config SMTP compartida por todas las cuentas del pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_send_timeout_secs() -> u64 {
    30
}

/// Datos de la empresa que se inyectan en los placeholders del prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    pub name: String,
    pub services: Vec<String>,
    pub website: String,
    pub contact_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub email: EmailConfig,
    pub company: CompanyConfig,
}

impl AppConfig {
    /// Carga config/app.config.json (o la ruta indicada).
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Configuration file not found: {:?}", path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration file: {:?}", path))
    }
}

fn default_config_path() -> PathBuf {
    Path::new("config").join("app.config.json")
}

/// Plantilla de prompt (config/prompts/default.txt por defecto).
pub fn load_prompt_template(prompt_path: Option<&Path>) -> Result<String> {
    let path = prompt_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new("config").join("prompts").join("default.txt"));

    fs::read_to_string(&path).with_context(|| format!("Prompt template not found: {:?}", path))
}

/// API key de OpenRouter. Si falta, el arranque del comando es fatal.
pub fn openrouter_api_key() -> Result<String> {
    env::var("OPENROUTER_API_KEY").context(
        "OPENROUTER_API_KEY not found in environment variables. Please check your .env file",
    )
}

/// Reply-To opcional para los correos salientes.
pub fn reply_to() -> Option<String> {
    env::var("REPLY_TO").ok().filter(|v| !v.is_empty())
}

/// CSV de cuentas SMTP (./smtp.csv, junto al binario).
pub fn smtp_csv_path() -> PathBuf {
    PathBuf::from("smtp.csv")
}

/// Directorio data/ para la base y los reportes; se crea si no existe.
pub fn data_dir() -> Result<PathBuf> {
    let dir = PathBuf::from("data");
    fs::create_dir_all(&dir).context("No se pudo crear el directorio 'data'")?;
    Ok(dir)
}

pub fn database_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("email-loop.db"))
}

pub fn log_dir() -> PathBuf {
    PathBuf::from("logs")
}
