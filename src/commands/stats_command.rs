//! commands/stats_command.rs
//! Subcomando `stats`: contadores persistidos por cuenta SMTP.

use anyhow::Result;

use crate::config::app_config;
use crate::services::pool_service::SmtpPool;
use crate::services::stats_service::StatsService;

pub async fn run(stats: StatsService) -> Result<()> {
    let pool = SmtpPool::load(&app_config::smtp_csv_path(), stats).await?;
    let accounts = pool.accounts_with_stats().await?;

    log::info!("SMTP Account Statistics");
    for account in &accounts {
        match account.last_sent_at {
            Some(last) => log::info!(
                "{}: {} emails sent (last: {})",
                account.email,
                account.sent_count,
                last.to_rfc3339()
            ),
            None => log::info!("{}: {} emails sent", account.email, account.sent_count),
        }
    }

    let total: i64 = accounts.iter().map(|a| a.sent_count).sum();
    log::info!("Total: {} emails across {} accounts", total, accounts.len());

    Ok(())
}
