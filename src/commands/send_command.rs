//! commands/send_command.rs
//! Subcomando `send`: corre la campaña completa desde un CSV de clientes.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::config::app_config::{self, AppConfig};
use crate::services::campaign_service::{CampaignOptions, CampaignService};
use crate::services::csv_service;
use crate::services::generator_service::EmailGenerator;
use crate::services::llm_service::LlmClient;
use crate::services::pool_service::SmtpPool;
use crate::services::report_service::ReportService;
use crate::services::sender_service::EmailSender;
use crate::services::stats_service::StatsService;

pub async fn run(stats: StatsService, csv: &Path, dry_run: bool, delay: Option<u64>) -> Result<()> {
    let config = AppConfig::load(None)?;

    // Todo lo fatal se resuelve ANTES de tocar al primer cliente:
    // clientes, cuentas, API key y plantilla.
    let customers = csv_service::parse_customers(csv)?;
    if customers.is_empty() {
        // Corrida vacía: no hay a quién escribir, pero el resumen
        // acumulado del final se muestra igual.
        log::warn!("No valid customers in {:?}", csv);
    }

    let pool = SmtpPool::load(&app_config::smtp_csv_path(), stats.clone()).await?;

    let api_key = app_config::openrouter_api_key()?;
    let llm_client = LlmClient::new(&config, api_key)?;
    let prompt_template = app_config::load_prompt_template(None)?;
    let generator = EmailGenerator::new(&config, llm_client, prompt_template);

    let sender = EmailSender::new(config.email.clone());

    let options = CampaignOptions {
        dry_run,
        delay_ms: delay.unwrap_or(config.email.rate_limit.delay_between_emails),
        reply_to: app_config::reply_to(),
    };

    log::info!(
        "Starting email campaign for {} customers{}",
        customers.len(),
        if dry_run { " (DRY RUN)" } else { "" }
    );

    let mut campaign = CampaignService::new(
        pool,
        Arc::new(generator),
        Arc::new(sender),
        stats.clone(),
        options,
    );
    campaign.run(&customers).await?;

    // El resumen de la corrida solo tiene sentido si algo se persistió
    if !dry_run {
        let report_service = ReportService::new(stats);
        let report = report_service.generate_report().await?;
        report_service.display_report(&report);
        report_service.save_report(&report)?;
    }

    Ok(())
}
