//! services/pool_service.rs
//! Pool de cuentas SMTP: selección por menor sent_count + blacklist de sesión.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Result};

use crate::models::smtp_model::{SmtpAccount, SmtpAccountWithStats};
use crate::services::csv_service;
use crate::services::stats_service::StatsService;

pub struct SmtpPool {
    /// Cuentas en el orden del CSV; ese orden desempata la selección.
    accounts: Vec<SmtpAccount>,
    /// Cuentas quemadas en ESTA corrida. Nunca se persiste.
    blacklist: HashSet<String>,
    stats: StatsService,
}

impl SmtpPool {
    /// Carga las cuentas desde el CSV. Cero cuentas válidas es fatal.
    pub async fn load(csv_path: &Path, stats: StatsService) -> Result<Self> {
        let accounts = csv_service::parse_smtp_accounts(csv_path)?;
        Self::from_accounts(accounts, stats, csv_path).await
    }

    async fn from_accounts(
        accounts: Vec<SmtpAccount>,
        stats: StatsService,
        origin: &Path,
    ) -> Result<Self> {
        if accounts.is_empty() {
            bail!("No valid SMTP accounts found in {:?}", origin);
        }

        // Cada cuenta recién vista arranca con sent_count = 0 en la base
        for account in &accounts {
            stats.ensure_account(&account.email).await?;
        }

        log::info!("Loaded {} SMTP accounts", accounts.len());

        Ok(SmtpPool {
            accounts,
            blacklist: HashSet::new(),
            stats,
        })
    }

    #[cfg(test)]
    pub async fn with_accounts(accounts: Vec<SmtpAccount>, stats: StatsService) -> Result<Self> {
        Self::from_accounts(accounts, stats, Path::new("<test>")).await
    }

    /// Cuenta disponible con menos envíos, o None si todas están en
    /// blacklist. El contador se lee fresco de la base en cada llamada;
    /// los empates quedan en el orden del CSV.
    pub async fn select_next(&self) -> Result<Option<SmtpAccountWithStats>> {
        let mut candidates = Vec::new();
        for account in &self.accounts {
            if self.blacklist.contains(&account.email) {
                continue;
            }

            let sent_count = self.stats.sent_count(&account.email).await?;
            candidates.push(SmtpAccountWithStats {
                email: account.email.clone(),
                app_password: account.app_password.clone(),
                sent_count,
                last_sent_at: None,
            });
        }

        if candidates.is_empty() {
            return Ok(None);
        }

        // sort estable: el desempate por orden de carga sale gratis
        candidates.sort_by_key(|c| c.sent_count);
        Ok(candidates.into_iter().next())
    }

    /// Marca la cuenta como quemada para el resto de la corrida.
    /// Idempotente; marcar dos veces no cambia nada.
    pub fn mark_failed(&mut self, email: &str) {
        if self.blacklist.insert(email.to_string()) {
            log::warn!("SMTP account blacklisted for this run: {}", email);
        }
    }

    /// Incrementa el contador persistido tras un envío confirmado.
    pub async fn record_success(&self, email: &str) -> Result<()> {
        self.stats.increment_sent_count(email).await
    }

    /// Cuentas que siguen en juego (total menos blacklist).
    pub fn available_count(&self) -> usize {
        self.accounts.len() - self.blacklist.len()
    }

    /// Todas las cuentas con sus stats persistidas (para test-smtp y stats).
    pub async fn accounts_with_stats(&self) -> Result<Vec<SmtpAccountWithStats>> {
        let mut result = Vec::new();
        for account in &self.accounts {
            let (sent_count, last_sent_at) = self.stats.account_stats(&account.email).await?;
            result.push(SmtpAccountWithStats {
                email: account.email.clone(),
                app_password: account.app_password.clone(),
                sent_count,
                last_sent_at,
            });
        }
        Ok(result)
    }
}
