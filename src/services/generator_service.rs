//! services/generator_service.rs
//! Generación de contenido por cliente: plantilla de prompt + LlmClient.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::app_config::{AppConfig, CompanyConfig};
use crate::models::customer_model::Customer;
use crate::models::email_model::GenerationDecision;
use crate::services::llm_service::LlmClient;

/// Lo único que el orquestador sabe del generador. En tests se reemplaza
/// por una implementación de mentira.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, customer: &Customer) -> Result<GenerationDecision>;
}

pub struct EmailGenerator {
    llm_client: LlmClient,
    prompt_template: String,
    company: CompanyConfig,
}

impl EmailGenerator {
    pub fn new(config: &AppConfig, llm_client: LlmClient, prompt_template: String) -> Self {
        EmailGenerator {
            llm_client,
            prompt_template,
            company: config.company.clone(),
        }
    }

    /// Reemplaza los placeholders {{customer.*}} y {{company.*}}.
    fn build_prompt(&self, customer: &Customer) -> String {
        self.prompt_template
            .replace("{{customer.website}}", &customer.website)
            .replace("{{customer.email}}", &customer.email)
            .replace(
                "{{customer.firstName}}",
                customer.first_name.as_deref().unwrap_or(""),
            )
            .replace(
                "{{customer.lastName}}",
                customer.last_name.as_deref().unwrap_or(""),
            )
            .replace("{{company.name}}", &self.company.name)
            .replace("{{company.services}}", &self.company.services.join(", "))
            .replace("{{company.website}}", &self.company.website)
            .replace("{{company.contactEmail}}", &self.company.contact_email)
    }
}

#[async_trait]
impl ContentGenerator for EmailGenerator {
    async fn generate(&self, customer: &Customer) -> Result<GenerationDecision> {
        log::info!(
            "(generate) Generating email for {} ({})",
            customer.email,
            customer.website
        );

        let prompt = self.build_prompt(customer);
        let decision = self.llm_client.generate(customer, &prompt).await?;

        if let GenerationDecision::Email { subject, .. } = &decision {
            log::info!("(generate) Generated subject: {}", subject);
        }

        Ok(decision)
    }
}
