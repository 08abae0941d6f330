//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod customer_model;
pub mod email_model;
pub mod report_model;
pub mod smtp_model;
