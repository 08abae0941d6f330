//! services/csv_service.rs
//! Parsing de los CSV de entrada (clientes y cuentas SMTP) con headers flexibles.

use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::StringRecord;

use crate::models::customer_model::Customer;
use crate::models::smtp_model::SmtpAccount;

// Aliases aceptados por campo lógico. La comparación es case-insensitive
// y se resuelve UNA sola vez contra la fila de headers, no por registro.
const WEBSITE_ALIASES: &[&str] = &["website", "url", "site"];
const EMAIL_ALIASES: &[&str] = &["email", "contact"];
const FIRST_NAME_ALIASES: &[&str] = &["firstname", "first_name", "first name"];
const LAST_NAME_ALIASES: &[&str] = &["lastname", "last_name", "last name"];
const PASSWORD_ALIASES: &[&str] = &["password", "apppassword", "app_password"];

/// Primera columna cuyo header coincide con alguno de los aliases.
fn resolve_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        aliases.iter().any(|a| h == *a)
    })
}

fn field_at(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parsea el CSV de clientes. Filas sin website o sin email se saltan
/// con warning; no tumban la corrida.
pub fn parse_customers(path: &Path) -> Result<Vec<Customer>> {
    log::info!("Parsing CSV file: {:?}", path);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("CSV file not found: {:?}", path))?;

    let headers = reader.headers().context("CSV sin fila de headers")?.clone();

    let website_idx = resolve_column(&headers, WEBSITE_ALIASES);
    let email_idx = resolve_column(&headers, EMAIL_ALIASES);
    let first_name_idx = resolve_column(&headers, FIRST_NAME_ALIASES);
    let last_name_idx = resolve_column(&headers, LAST_NAME_ALIASES);

    let mut customers = Vec::new();
    for (line, record) in reader.records().enumerate() {
        // line + 2: la fila 1 del archivo son los headers
        let record = record.with_context(|| format!("Fila {} ilegible", line + 2))?;

        let website = field_at(&record, website_idx);
        let email = field_at(&record, email_idx);

        match (website, email) {
            (Some(website), Some(email)) => customers.push(Customer {
                website,
                email,
                first_name: field_at(&record, first_name_idx),
                last_name: field_at(&record, last_name_idx),
            }),
            _ => log::warn!(
                "Skipping row {}: missing required fields (website or email)",
                line + 2
            ),
        }
    }

    log::info!("Parsed {} valid customers", customers.len());
    Ok(customers)
}

/// Parsea el CSV de cuentas SMTP (email + app password).
pub fn parse_smtp_accounts(path: &Path) -> Result<Vec<SmtpAccount>> {
    if !path.exists() {
        bail!("SMTP configuration file not found: {:?}", path);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Could not open SMTP CSV: {:?}", path))?;

    let headers = reader.headers().context("CSV sin fila de headers")?.clone();

    let email_idx = resolve_column(&headers, EMAIL_ALIASES);
    let password_idx = resolve_column(&headers, PASSWORD_ALIASES);

    let mut accounts = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Fila {} ilegible", line + 2))?;

        match (
            field_at(&record, email_idx),
            field_at(&record, password_idx),
        ) {
            (Some(email), Some(app_password)) => {
                accounts.push(SmtpAccount {
                    email,
                    app_password,
                });
            }
            _ => log::warn!("Skipping invalid SMTP record at row {}", line + 2),
        }
    }

    Ok(accounts)
}
