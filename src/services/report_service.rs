//! services/report_service.rs
//! Reporte de campaña: cálculo, impresión en consola y export a JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::app_config;
use crate::models::report_model::SendReport;
use crate::services::stats_service::StatsService;

#[derive(Clone)]
pub struct ReportService {
    stats: StatsService,
}

impl ReportService {
    pub fn new(stats: StatsService) -> Self {
        ReportService { stats }
    }

    pub async fn generate_report(&self) -> Result<SendReport> {
        self.stats.report_stats().await
    }

    /// Imprime el reporte por el logger (consola + archivo de la corrida).
    pub fn display_report(&self, report: &SendReport) {
        let bar = "=".repeat(60);
        let sep = "-".repeat(40);

        log::info!("{}", bar);
        log::info!("EMAIL CAMPAIGN REPORT");
        log::info!("{}", bar);
        log::info!("Generated at: {}", report.generated_at.to_rfc3339());

        log::info!("SUMMARY");
        log::info!("{}", sep);
        log::info!("Total Emails Attempted: {}", report.total_emails);
        log::info!(
            "Successful: {} ({}%)",
            report.success_count,
            percentage(report.success_count, report.total_emails)
        );
        log::info!(
            "Failed: {} ({}%)",
            report.failure_count,
            percentage(report.failure_count, report.total_emails)
        );

        if !report.smtp_stats.is_empty() {
            log::info!("SMTP ACCOUNT STATISTICS");
            log::info!("{}", sep);
            for smtp in &report.smtp_stats {
                log::info!("{}", smtp.email);
                log::info!("  Sent: {} | Failed: {}", smtp.sent, smtp.failed);
            }
        }

        if !report.failures.is_empty() {
            log::info!("RECENT FAILURES");
            log::info!("{}", sep);
            for failure in &report.failures {
                log::info!("Customer: {}", failure.customer_email);
                log::info!("  SMTP: {}", failure.smtp_email);
                log::info!("  Error: {}", failure.error);
            }
        }

        log::info!("{}", bar);
    }

    /// Guarda el reporte como data/report-<timestamp>.json.
    pub fn save_report(&self, report: &SendReport) -> Result<PathBuf> {
        let data_dir = app_config::data_dir()?;
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        let path = data_dir.join(format!("report-{}.json", timestamp));

        let json =
            serde_json::to_string_pretty(report).context("No se pudo serializar el reporte")?;
        fs::write(&path, json)
            .with_context(|| format!("No se pudo guardar el reporte en {:?}", path))?;

        log::info!("Report saved to: {:?}", path);
        Ok(path)
    }
}

fn percentage(part: i64, total: i64) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", (part as f64 / total as f64) * 100.0)
}
