//! services/sender_service.rs
//! Transporte SMTP con lettre + clasificación de errores de envío.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::app_config::EmailConfig;
use crate::models::customer_model::Customer;
use crate::models::email_model::{GeneratedEmail, SendOutcome, SendStatus};
use crate::models::smtp_model::SmtpAccountWithStats;

/// Substrings (case-insensitive) que marcan una falla de autenticación.
const AUTH_ERROR_PATTERNS: &[&str] = &["invalid login", "authentication", "bad credentials"];

/// Cómo interpretar la falla de un intento de envío.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credenciales rechazadas: se arregla cambiando de cuenta.
    Auth,
    /// Red, cuota, timeout, destinatario inválido: otra cuenta no ayuda.
    Other,
}

pub fn classify_error(error_message: &str) -> FailureKind {
    let lowered = error_message.to_lowercase();
    if AUTH_ERROR_PATTERNS.iter().any(|p| lowered.contains(p)) {
        FailureKind::Auth
    } else {
        FailureKind::Other
    }
}

/// Lo único que el orquestador sabe del transporte. En tests se
/// reemplaza por una implementación de mentira.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// UN intento físico de envío. Nunca propaga error: el detalle de la
    /// falla queda dentro del outcome.
    async fn send_email(
        &self,
        account: &SmtpAccountWithStats,
        customer: &Customer,
        email: &GeneratedEmail,
        reply_to: Option<&str>,
    ) -> SendOutcome;

    /// Verificación de conexión y credenciales, sin enviar nada.
    async fn test_connection(&self, account: &SmtpAccountWithStats) -> bool;
}

#[derive(Clone)]
pub struct EmailSender {
    config: EmailConfig,
}

impl EmailSender {
    pub fn new(config: EmailConfig) -> Self {
        EmailSender { config }
    }

    fn build_transport(
        &self,
        account: &SmtpAccountWithStats,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let tls_params = TlsParameters::new(self.config.smtp_host.clone())?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                account.email.clone(),
                account.app_password.clone(),
            ))
            .tls(Tls::Required(tls_params))
            .build();

        Ok(mailer)
    }

    fn build_message(
        &self,
        account: &SmtpAccountWithStats,
        customer: &Customer,
        email: &GeneratedEmail,
        reply_to: Option<&str>,
    ) -> Result<Message> {
        let from: Mailbox = account.email.parse().context("Invalid from address")?;
        let to: Mailbox = customer.email.parse().context("Invalid recipient address")?;

        let mut builder = Message::builder().from(from).to(to).subject(&email.subject);

        if let Some(reply_to) = reply_to {
            builder = builder.reply_to(reply_to.parse().context("Invalid reply-to address")?);
        }

        // Texto plano + la misma versión renderizada a HTML
        let text_part = SinglePart::builder()
            .header(ContentType::parse("text/plain; charset=utf-8")?)
            .body(email.body.clone());
        let html_part = SinglePart::builder()
            .header(ContentType::parse("text/html; charset=utf-8")?)
            .body(render_html(&email.body));

        let message = builder.multipart(
            MultiPart::alternative()
                .singlepart(text_part)
                .singlepart(html_part),
        )?;

        Ok(message)
    }

    async fn try_send(
        &self,
        account: &SmtpAccountWithStats,
        customer: &Customer,
        email: &GeneratedEmail,
        reply_to: Option<&str>,
    ) -> Result<()> {
        let mailer = self.build_transport(account)?;
        let message = self.build_message(account, customer, email, reply_to)?;

        let send_timeout = Duration::from_secs(self.config.send_timeout_secs);
        tokio::time::timeout(send_timeout, mailer.send(message))
            .await
            .context("SMTP send timed out")??;

        Ok(())
    }
}

#[async_trait]
impl DeliveryTransport for EmailSender {
    async fn send_email(
        &self,
        account: &SmtpAccountWithStats,
        customer: &Customer,
        email: &GeneratedEmail,
        reply_to: Option<&str>,
    ) -> SendOutcome {
        let mut outcome = SendOutcome {
            customer_email: customer.email.clone(),
            customer_website: customer.website.clone(),
            smtp_email: account.email.clone(),
            subject: email.subject.clone(),
            status: SendStatus::Failed,
            error_message: None,
            sent_at: Utc::now(),
        };

        match self.try_send(account, customer, email, reply_to).await {
            Ok(()) => {
                log::info!(
                    "(send_email) Sent to {} via {}",
                    customer.email,
                    account.email
                );
                outcome.status = SendStatus::Success;
            }
            Err(e) => {
                let message = format!("{e:#}");
                log::error!(
                    "(send_email) Failed to send to {} via {}: {}",
                    customer.email,
                    account.email,
                    message
                );
                outcome.error_message = Some(message);
            }
        }

        outcome
    }

    async fn test_connection(&self, account: &SmtpAccountWithStats) -> bool {
        match self.build_transport(account) {
            Ok(mailer) => mailer.test_connection().await.unwrap_or(false),
            Err(e) => {
                log::error!("(test_connection) {}: {:#}", account.email, e);
                false
            }
        }
    }
}

/// Render mínimo del cuerpo a HTML: se escapan entidades, los bloques
/// separados por línea en blanco quedan como <p> y los saltos simples
/// como <br>.
pub(crate) fn render_html(body: &str) -> String {
    let escaped = body
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let normalized = escaped.replace("\r\n", "\n");

    let paragraphs = normalized
        .split("\n\n")
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <style>\n    \
body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; \
max-width: 600px; margin: 0 auto; padding: 20px; }}\n    \
p {{ margin: 0 0 1em 0; }}\n  </style>\n</head>\n<body>\n{}\n</body>\n</html>",
        paragraphs
    )
}
