use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::email_model::SendOutcome;
use crate::models::report_model::{ReportFailure, SendReport, SmtpReportRow};

/// Cuántas fallas recientes entran al reporte.
const RECENT_FAILURES_LIMIT: i64 = 20;

/// Acceso a SQLite: contadores por cuenta SMTP + historial de envíos.
#[derive(Clone, Debug)]
pub struct StatsService {
    db_pool: Pool<Sqlite>,
}

impl StatsService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        StatsService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await?;
        Ok(())
    }

    /// Garantiza la fila de la cuenta (sent_count = 0 si es nueva).
    pub async fn ensure_account(&self, email: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO smtp_accounts (email, sent_count) VALUES (?1, 0)")
            .bind(email)
            .execute(&self.db_pool)
            .await
            .context("Fallo al registrar cuenta SMTP")?;

        Ok(())
    }

    /// Contador actual de la cuenta. Siempre se lee fresco de la base:
    /// otra corrida en paralelo puede haberlo movido.
    pub async fn sent_count(&self, email: &str) -> Result<i64> {
        self.ensure_account(email).await?;

        let row = sqlx::query("SELECT sent_count FROM smtp_accounts WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al leer sent_count")?;

        Ok(row.get("sent_count"))
    }

    /// Incremento + last_sent_at en un solo statement.
    pub async fn increment_sent_count(&self, email: &str) -> Result<()> {
        self.ensure_account(email).await?;

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE smtp_accounts
            SET sent_count = sent_count + 1,
                last_sent_at = ?2
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al incrementar sent_count")?;

        Ok(())
    }

    /// Contador + última fecha de envío de una cuenta.
    pub async fn account_stats(&self, email: &str) -> Result<(i64, Option<DateTime<Utc>>)> {
        self.ensure_account(email).await?;

        let row = sqlx::query("SELECT sent_count, last_sent_at FROM smtp_accounts WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al leer stats de la cuenta")?;

        let sent_count: i64 = row.get("sent_count");
        let last_sent_at: Option<String> = row.get("last_sent_at");
        let last_sent_at = match last_sent_at {
            Some(raw) => Some(raw.parse().context("last_sent_at inválido en la base")?),
            None => None,
        };

        Ok((sent_count, last_sent_at))
    }

    /// Inserta el registro de UN intento físico (append-only).
    pub async fn record_outcome(&self, outcome: &SendOutcome) -> Result<()> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO send_history (
                id, customer_email, customer_website, smtp_email,
                subject, status, error_message, sent_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(id)
        .bind(&outcome.customer_email)
        .bind(&outcome.customer_website)
        .bind(&outcome.smtp_email)
        .bind(&outcome.subject)
        .bind(outcome.status.as_str())
        .bind(&outcome.error_message)
        .bind(outcome.sent_at.to_rfc3339())
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar en send_history")?;

        Ok(())
    }

    /// Agrega el reporte completo desde send_history.
    pub async fn report_stats(&self) -> Result<SendReport> {
        let total_emails: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM send_history")
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar send_history")?;

        let success_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM send_history WHERE status = 'success'")
                .fetch_one(&self.db_pool)
                .await?;

        let failure_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM send_history WHERE status = 'failed'")
                .fetch_one(&self.db_pool)
                .await?;

        let smtp_rows = sqlx::query(
            r#"
            SELECT
                smtp_email,
                SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END) AS sent,
                SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END) AS failed
            FROM send_history
            GROUP BY smtp_email
            ORDER BY smtp_email
            "#,
        )
        .fetch_all(&self.db_pool)
        .await?;

        let smtp_stats = smtp_rows
            .into_iter()
            .map(|r| SmtpReportRow {
                email: r.get("smtp_email"),
                sent: r.get("sent"),
                failed: r.get("failed"),
            })
            .collect();

        let failure_rows = sqlx::query(
            r#"
            SELECT customer_email, smtp_email, error_message
            FROM send_history
            WHERE status = 'failed'
            ORDER BY sent_at DESC
            LIMIT ?1
            "#,
        )
        .bind(RECENT_FAILURES_LIMIT)
        .fetch_all(&self.db_pool)
        .await?;

        let failures = failure_rows
            .into_iter()
            .map(|r| ReportFailure {
                customer_email: r.get("customer_email"),
                smtp_email: r.get("smtp_email"),
                error: r
                    .get::<Option<String>, _>("error_message")
                    .unwrap_or_default(),
            })
            .collect();

        Ok(SendReport {
            total_emails,
            success_count,
            failure_count,
            smtp_stats,
            failures,
            generated_at: Utc::now(),
        })
    }
}
