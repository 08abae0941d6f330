//! models/email_model.rs
//! Decisión del generador de contenido + resultado de cada intento de envío

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contenido listo para enviar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
}

/// Lo que el LLM decide hacer con un cliente. Se decodifica estricto:
/// cualquier payload que no calce con una de las tres variantes es error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum GenerationDecision {
    /// Redactar y enviar.
    Email { subject: String, body: String },
    /// No contactar a este cliente.
    Skip { reason: String },
    /// Derivar a otro flujo (revisión manual, otra campaña, etc.).
    Route { reason: String, next_step: String },
}

/// Estado persistido de un intento en send_history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Success,
    Failed,
    /// Reservado para registros manuales; el orquestador nunca lo escribe.
    Skipped,
}

impl SendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendStatus::Success => "success",
            SendStatus::Failed => "failed",
            SendStatus::Skipped => "skipped",
        }
    }
}

/// Registro de UN intento físico de envío. Una fila por intento,
/// incluyendo los fallidos de un mismo cliente.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub customer_email: String,
    pub customer_website: String,
    pub smtp_email: String,
    pub subject: String,
    pub status: SendStatus,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}
