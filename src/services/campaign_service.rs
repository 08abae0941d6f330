//! services/campaign_service.rs
//! Orquestador de la campaña: selección de cuenta, generación de contenido,
//! envío con failover y ritmo entre clientes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;

use crate::models::customer_model::Customer;
use crate::models::email_model::{GeneratedEmail, GenerationDecision, SendStatus};
use crate::models::smtp_model::SmtpAccountWithStats;
use crate::services::generator_service::ContentGenerator;
use crate::services::pool_service::SmtpPool;
use crate::services::sender_service::{classify_error, DeliveryTransport, FailureKind};
use crate::services::stats_service::StatsService;

/// Máximo de envíos físicos por cliente, contando el primero.
const MAX_SEND_ATTEMPTS: u32 = 3;
/// Jitter multiplicativo sobre el delay base (±20%).
const DELAY_JITTER_FACTOR: f64 = 0.2;

/// Opciones de una corrida de campaña.
#[derive(Debug, Clone)]
pub struct CampaignOptions {
    pub dry_run: bool,
    /// Delay base entre clientes, en ms.
    pub delay_ms: u64,
    pub reply_to: Option<String>,
}

/// Cómo terminó el pipeline de UN cliente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerOutcome {
    /// Entregado, tras `attempts` envíos físicos.
    Sent { smtp_email: String, attempts: u32 },
    /// Dry-run: solo preview, sin envío ni persistencia.
    Preview,
    /// El generador decidió no contactarlo.
    Skipped { reason: String },
    /// El generador lo derivó a otro flujo.
    Routed { reason: String, next_step: String },
    /// Sin correo entregado en esta corrida.
    Abandoned { reason: AbandonReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbandonReason {
    /// Todas las cuentas del pool están en blacklist.
    NoAccountAvailable,
    /// Falló la generación de contenido (no se reintenta).
    Generation(String),
    /// Falla de envío no-auth: reintentar con otra cuenta no ayuda.
    Delivery(String),
    /// Se agotó el tope de intentos físicos.
    AttemptsExhausted,
}

pub struct CampaignService {
    pool: SmtpPool,
    generator: Arc<dyn ContentGenerator>,
    transport: Arc<dyn DeliveryTransport>,
    stats: StatsService,
    options: CampaignOptions,
}

impl CampaignService {
    pub fn new(
        pool: SmtpPool,
        generator: Arc<dyn ContentGenerator>,
        transport: Arc<dyn DeliveryTransport>,
        stats: StatsService,
        options: CampaignOptions,
    ) -> Self {
        CampaignService {
            pool,
            generator,
            transport,
            stats,
            options,
        }
    }

    /// Corre la campaña completa, un cliente a la vez. Lo que le pase a
    /// un cliente (error incluido) jamás frena a los siguientes.
    pub async fn run(&mut self, customers: &[Customer]) -> Result<()> {
        let total = customers.len();

        for (index, customer) in customers.iter().enumerate() {
            log::info!(
                "[{}/{}] Processing {} ({})",
                index + 1,
                total,
                customer.email,
                customer.website
            );

            match self.process_customer(customer).await {
                Ok(outcome) => self.log_outcome(customer, &outcome),
                Err(e) => {
                    log::error!("Error processing {}: {:#}", customer.email, e);
                }
            }

            // Pausa con jitter entre clientes; nunca tras el último ni en dry-run
            if index + 1 < total && !self.options.dry_run {
                let delay = jittered_delay(self.options.delay_ms);
                log::info!(
                    "Waiting {}ms before next email (base: {}ms)",
                    delay.as_millis(),
                    self.options.delay_ms
                );
                tokio::time::sleep(delay).await;
            }
        }

        log::info!("Campaign complete");
        Ok(())
    }

    /// Pipeline de un solo cliente. Todo término "esperable" es
    /// Ok(outcome); un Err acá es algo imprevisto (p.e. la base caída)
    /// y el loop lo degrada a log.
    pub async fn process_customer(&mut self, customer: &Customer) -> Result<CustomerOutcome> {
        // 1) Selección de cuenta, con contadores frescos
        let Some(account) = self.pool.select_next().await? else {
            log::warn!(
                "No SMTP account available for {} (all blacklisted), skipping",
                customer.email
            );
            return Ok(CustomerOutcome::Abandoned {
                reason: AbandonReason::NoAccountAvailable,
            });
        };
        log::info!(
            "Selected SMTP: {} (sent: {})",
            account.email,
            account.sent_count
        );

        // 2) Generación de contenido (sin reintentos)
        let decision = match self.generator.generate(customer).await {
            Ok(decision) => decision,
            Err(e) => {
                return Ok(CustomerOutcome::Abandoned {
                    reason: AbandonReason::Generation(format!("{e:#}")),
                });
            }
        };

        // 3) La decisión del modelo manda
        let email = match decision {
            GenerationDecision::Email { subject, body } => GeneratedEmail { subject, body },
            GenerationDecision::Skip { reason } => {
                return Ok(CustomerOutcome::Skipped { reason });
            }
            GenerationDecision::Route { reason, next_step } => {
                return Ok(CustomerOutcome::Routed { reason, next_step });
            }
        };

        // 4) Dry-run: preview y nada más (ni envío ni historial)
        if self.options.dry_run {
            log::info!("--- DRY RUN: Email Preview ---");
            log::info!("To: {}", customer.email);
            log::info!("Subject: {}", email.subject);
            log::info!("Body:\n{}", email.body);
            log::info!("--- End Preview ---");
            return Ok(CustomerOutcome::Preview);
        }

        // 5) Envío con failover
        self.deliver_with_retries(customer, account, &email).await
    }

    /// Loop de envío: cada envío físico consume exactamente un intento y
    /// deja exactamente una fila en send_history, falle o no.
    async fn deliver_with_retries(
        &mut self,
        customer: &Customer,
        mut account: SmtpAccountWithStats,
        email: &GeneratedEmail,
    ) -> Result<CustomerOutcome> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let outcome = self
                .transport
                .send_email(&account, customer, email, self.options.reply_to.as_deref())
                .await;

            self.stats
                .record_outcome(&outcome)
                .await
                .context("Fallo al persistir el intento en send_history")?;

            if outcome.status == SendStatus::Success {
                self.pool.record_success(&account.email).await?;
                return Ok(CustomerOutcome::Sent {
                    smtp_email: account.email,
                    attempts,
                });
            }

            let error_message = outcome.error_message.clone().unwrap_or_default();
            match classify_error(&error_message) {
                FailureKind::Other => {
                    // Otra cuenta no arregla un timeout ni una cuota
                    return Ok(CustomerOutcome::Abandoned {
                        reason: AbandonReason::Delivery(error_message),
                    });
                }
                FailureKind::Auth => {
                    self.pool.mark_failed(&account.email);
                    log::info!(
                        "Accounts still available: {}",
                        self.pool.available_count()
                    );

                    if attempts >= MAX_SEND_ATTEMPTS {
                        return Ok(CustomerOutcome::Abandoned {
                            reason: AbandonReason::AttemptsExhausted,
                        });
                    }

                    match self.pool.select_next().await? {
                        Some(replacement) => {
                            log::info!(
                                "Retrying {} with {} (attempt {}/{})",
                                customer.email,
                                replacement.email,
                                attempts + 1,
                                MAX_SEND_ATTEMPTS
                            );
                            account = replacement;
                        }
                        None => {
                            // Sin reemplazo: se abandona sin quemar otro intento
                            log::warn!(
                                "No replacement SMTP account for {}, abandoning",
                                customer.email
                            );
                            return Ok(CustomerOutcome::Abandoned {
                                reason: AbandonReason::NoAccountAvailable,
                            });
                        }
                    }
                }
            }
        }
    }

    fn log_outcome(&self, customer: &Customer, outcome: &CustomerOutcome) {
        match outcome {
            CustomerOutcome::Sent {
                smtp_email,
                attempts,
            } => {
                log::info!(
                    "Done with {} via {} ({} attempt(s))",
                    customer.email,
                    smtp_email,
                    attempts
                );
            }
            CustomerOutcome::Preview => {}
            CustomerOutcome::Skipped { reason } => {
                log::info!("Skipping {}: {}", customer.email, reason);
            }
            CustomerOutcome::Routed { reason, next_step } => {
                log::info!(
                    "Routing {} to '{}': {}",
                    customer.email,
                    next_step,
                    reason
                );
            }
            CustomerOutcome::Abandoned { reason } => {
                log::warn!("Abandoned {}: {:?}", customer.email, reason);
            }
        }
    }
}

/// Delay base ± jitter uniforme. El resultado queda siempre dentro de
/// [base*0.8, base*1.2], sin truncar a milisegundos enteros.
pub fn jittered_delay(base_ms: u64) -> Duration {
    if base_ms == 0 {
        return Duration::ZERO;
    }

    let jitter_range = (base_ms as f64) * DELAY_JITTER_FACTOR;
    let mut rng = rand::thread_rng();
    let jitter: f64 = rng.gen_range(-jitter_range..=jitter_range);

    Duration::from_secs_f64(((base_ms as f64) + jitter) / 1000.0)
}
