//! commands/test_smtp_command.rs
//! Subcomando `test-smtp`: verifica la conexión de cada cuenta del pool.

use anyhow::Result;

use crate::config::app_config::{self, AppConfig};
use crate::services::pool_service::SmtpPool;
use crate::services::sender_service::{DeliveryTransport, EmailSender};
use crate::services::stats_service::StatsService;

pub async fn run(stats: StatsService) -> Result<()> {
    let config = AppConfig::load(None)?;
    let pool = SmtpPool::load(&app_config::smtp_csv_path(), stats).await?;
    let sender = EmailSender::new(config.email.clone());

    let accounts = pool.accounts_with_stats().await?;
    log::info!("Testing {} SMTP accounts...", accounts.len());

    let mut failures = 0;
    for account in &accounts {
        if sender.test_connection(account).await {
            log::info!("OK: {}", account.email);
        } else {
            log::error!("FAILED: {}", account.email);
            failures += 1;
        }
    }

    if failures == 0 {
        log::info!("All {} accounts connected", accounts.len());
    } else {
        log::warn!("{}/{} accounts failed", failures, accounts.len());
    }

    Ok(())
}
