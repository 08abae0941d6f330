//! models/report_model.rs
//! Reporte agregado de la campaña (se calcula bajo demanda desde send_history)

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Totales por cuenta SMTP dentro del reporte.
#[derive(Debug, Clone, Serialize)]
pub struct SmtpReportRow {
    pub email: String,
    pub sent: i64,
    pub failed: i64,
}

/// Falla reciente (entran las últimas 20).
#[derive(Debug, Clone, Serialize)]
pub struct ReportFailure {
    pub customer_email: String,
    pub smtp_email: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    pub total_emails: i64,
    pub success_count: i64,
    pub failure_count: i64,
    pub smtp_stats: Vec<SmtpReportRow>,
    pub failures: Vec<ReportFailure>,
    pub generated_at: DateTime<Utc>,
}
