//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod campaign_service;
pub mod csv_service;
pub mod generator_service;
pub mod llm_service;
pub mod pool_service;
pub mod report_service;
pub mod sender_service;
pub mod stats_service;
