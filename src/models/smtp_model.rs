//! models/smtp_model.rs
//! Cuentas SMTP: identidad configurada + contadores vivos de la base

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cuenta tal como viene del CSV de cuentas (smtp.csv).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpAccount {
    pub email: String,
    /// App password (Gmail) o credencial equivalente del relay.
    pub app_password: String,
}

/// Cuenta junto con sus contadores persistidos.
#[derive(Debug, Clone)]
pub struct SmtpAccountWithStats {
    pub email: String,
    pub app_password: String,
    pub sent_count: i64,
    pub last_sent_at: Option<DateTime<Utc>>,
}
