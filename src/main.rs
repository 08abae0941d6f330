use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use sqlx::{Pool, Sqlite};

use crate::cli::{Cli, Commands};
use crate::config::app_config;
use crate::logger::init_logger;
use crate::services::stats_service::StatsService;

mod cli;
mod commands;
mod config;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

async fn setup_database() -> Result<Pool<Sqlite>> {
    // 1) Crear carpeta "data" y armar la ruta final: ./data/email-loop.db
    let db_path = app_config::database_path()?;
    // mode=rwc: crea el archivo si no existe
    let db_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());

    log::info!("Conectando a SQLite en {}", db_url);

    // 2) Conectarnos con SQLx
    let db_pool = Pool::<Sqlite>::connect(&db_url)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    Ok(db_pool)
}

async fn run(cli: Cli) -> Result<()> {
    // Conectarnos a la DB
    let db_pool = setup_database().await?;

    // StatsService es el único dueño del acceso a la base
    let stats = StatsService::new(db_pool);
    stats
        .run_migrations()
        .await
        .context("Fallo en migraciones")?;

    match cli.command {
        Commands::Send {
            csv,
            dry_run,
            delay,
        } => commands::send_command::run(stats, &csv, dry_run, delay).await,
        Commands::Report { save } => commands::report_command::run(stats, save).await,
        Commands::TestSmtp => commands::test_smtp_command::run(stats).await,
        Commands::Stats => commands::stats_command::run(stats).await,
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok(); // Cargar .env al inicio

    let cli = Cli::parse();

    let log_dir = app_config::log_dir();
    match init_logger(Some(log_dir.as_path())) {
        Ok(Some(path)) => log::info!("Logging to file: {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("No se pudo inicializar el logger: {e:#}");
            std::process::exit(1);
        }
    }

    // Los errores que llegan hasta acá son fatales de arranque
    // (config, CSV de cuentas, API key); los errores por cliente ya
    // quedaron contenidos dentro del loop de campaña.
    if let Err(e) = run(cli).await {
        log::error!("Fatal: {e:#}");
        std::process::exit(1);
    }
}
