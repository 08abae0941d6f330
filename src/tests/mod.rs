//! tests/mod.rs
//! Pruebas unitarias: pool de cuentas, orquestador de campaña, CSVs, sender y LLM.

mod pool_tests;

use sqlx::{Pool, Sqlite};
use tempfile::TempDir;

use crate::services::stats_service::StatsService;

/// Base SQLite de usar-y-tirar, con migraciones corridas.
/// El TempDir se devuelve para que viva lo que dure el test.
pub async fn temp_stats() -> (StatsService, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());

    let db_pool = Pool::<Sqlite>::connect(&db_url)
        .await
        .expect("Failed to connect to test db");

    let stats = StatsService::new(db_pool);
    stats
        .run_migrations()
        .await
        .expect("Failed to run migrations");

    (stats, dir)
}
