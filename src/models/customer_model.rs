//! models/customer_model.rs
//! Cliente tal como llega del CSV de entrada

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Sitio del prospecto; es lo que el generador usa para personalizar.
    pub website: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Customer {
    #[cfg(test)]
    pub fn test_new(email: &str, website: &str) -> Self {
        Self {
            website: website.to_string(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
        }
    }
}
