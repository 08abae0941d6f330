//! cli.rs
//! Definición del CLI (subcomandos send / report / test-smtp / stats).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI de campañas de email con balanceo de cuentas SMTP y contenido por LLM
#[derive(Parser, Debug)]
#[command(name = "email-loop")]
#[command(about = "Email campaign runner with SMTP load balancing", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send marketing emails to customers from a CSV file
    Send {
        /// Path to the customer CSV file
        #[arg(short, long)]
        csv: PathBuf,

        /// Generate emails without sending or recording anything
        #[arg(long)]
        dry_run: bool,

        /// Base delay between emails in ms (overrides the config value)
        #[arg(long)]
        delay: Option<u64>,
    },
    /// Display the aggregated campaign report
    Report {
        /// Also save the report as JSON under data/
        #[arg(long)]
        save: bool,
    },
    /// Test the connection of every SMTP account in the pool
    TestSmtp,
    /// Show per-account send counters
    Stats,
}
