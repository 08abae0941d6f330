//! config/mod.rs
//! Módulo de configuración de la aplicación.

pub mod app_config;
