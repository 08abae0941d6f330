//! tests/pool_tests.rs
//! Pruebas del pool de cuentas SMTP: selección, blacklist y carga desde CSV.

use std::fs;

use crate::models::smtp_model::SmtpAccount;
use crate::services::pool_service::SmtpPool;

use super::temp_stats;

fn account(email: &str) -> SmtpAccount {
    SmtpAccount {
        email: email.to_string(),
        app_password: "pw".to_string(),
    }
}

#[tokio::test]
async fn test_select_prefers_least_loaded_account() {
    let (stats, _dir) = temp_stats().await;

    // a con 5 envíos, b con 2
    stats.ensure_account("a@test.com").await.unwrap();
    stats.ensure_account("b@test.com").await.unwrap();
    for _ in 0..5 {
        stats.increment_sent_count("a@test.com").await.unwrap();
    }
    for _ in 0..2 {
        stats.increment_sent_count("b@test.com").await.unwrap();
    }

    let pool = SmtpPool::with_accounts(
        vec![account("a@test.com"), account("b@test.com")],
        stats.clone(),
    )
    .await
    .unwrap();

    let selected = pool.select_next().await.unwrap().expect("pool no vacío");
    assert_eq!(selected.email, "b@test.com");
    assert_eq!(selected.sent_count, 2);
}

#[tokio::test]
async fn test_tie_breaks_by_csv_order() {
    let (stats, _dir) = temp_stats().await;

    let pool = SmtpPool::with_accounts(
        vec![account("z@test.com"), account("a@test.com")],
        stats.clone(),
    )
    .await
    .unwrap();

    // Ambas con 0 envíos: gana la primera del CSV, no el orden alfabético
    let selected = pool.select_next().await.unwrap().unwrap();
    assert_eq!(selected.email, "z@test.com");
}

#[tokio::test]
async fn test_selection_follows_recorded_successes() {
    let (stats, _dir) = temp_stats().await;

    for _ in 0..5 {
        stats.increment_sent_count("a@test.com").await.unwrap();
    }
    for _ in 0..2 {
        stats.increment_sent_count("b@test.com").await.unwrap();
    }

    let mut pool = SmtpPool::with_accounts(
        vec![account("a@test.com"), account("b@test.com")],
        stats.clone(),
    )
    .await
    .unwrap();

    // b (2) gana sobre a (5); tras un envío sigue ganando con 3
    let first = pool.select_next().await.unwrap().unwrap();
    assert_eq!(first.email, "b@test.com");
    pool.record_success("b@test.com").await.unwrap();

    let second = pool.select_next().await.unwrap().unwrap();
    assert_eq!(second.email, "b@test.com");
    assert_eq!(second.sent_count, 3);

    // si b se quema, el reemplazo es a
    pool.mark_failed("b@test.com");
    let third = pool.select_next().await.unwrap().unwrap();
    assert_eq!(third.email, "a@test.com");
}

#[tokio::test]
async fn test_blacklist_sticks_for_the_whole_run() {
    let (stats, _dir) = temp_stats().await;

    let mut pool = SmtpPool::with_accounts(
        vec![account("a@test.com"), account("b@test.com")],
        stats.clone(),
    )
    .await
    .unwrap();

    pool.mark_failed("a@test.com");
    // marcarla de nuevo no cambia nada
    pool.mark_failed("a@test.com");
    assert_eq!(pool.available_count(), 1);

    // aunque b acumule más envíos que a, a nunca vuelve
    for _ in 0..10 {
        pool.record_success("b@test.com").await.unwrap();
    }
    let selected = pool.select_next().await.unwrap().unwrap();
    assert_eq!(selected.email, "b@test.com");
    assert_eq!(selected.sent_count, 10);
}

#[tokio::test]
async fn test_select_returns_none_when_all_blacklisted() {
    let (stats, _dir) = temp_stats().await;

    let mut pool = SmtpPool::with_accounts(
        vec![account("a@test.com"), account("b@test.com")],
        stats.clone(),
    )
    .await
    .unwrap();

    pool.mark_failed("a@test.com");
    pool.mark_failed("b@test.com");

    assert!(pool.select_next().await.unwrap().is_none());
    assert_eq!(pool.available_count(), 0);
}

#[tokio::test]
async fn test_counts_are_read_fresh_on_every_selection() {
    let (stats, _dir) = temp_stats().await;

    let pool = SmtpPool::with_accounts(
        vec![account("a@test.com"), account("b@test.com")],
        stats.clone(),
    )
    .await
    .unwrap();

    let first = pool.select_next().await.unwrap().unwrap();
    assert_eq!(first.email, "a@test.com");

    // otra corrida mueve el contador por fuera del pool
    for _ in 0..3 {
        stats.increment_sent_count("a@test.com").await.unwrap();
    }

    let second = pool.select_next().await.unwrap().unwrap();
    assert_eq!(second.email, "b@test.com");
}

#[tokio::test]
async fn test_load_fails_without_csv_file() {
    let (stats, dir) = temp_stats().await;

    let missing = dir.path().join("no-such.csv");
    let result = SmtpPool::load(&missing, stats).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_fails_with_zero_valid_accounts() {
    let (stats, dir) = temp_stats().await;

    // filas presentes pero ninguna válida (falta el password)
    let csv_path = dir.path().join("smtp.csv");
    fs::write(&csv_path, "email,password\nonly-email@test.com,\n").unwrap();

    let result = SmtpPool::load(&csv_path, stats).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_skips_invalid_rows_and_keeps_valid_ones() {
    let (stats, dir) = temp_stats().await;

    let csv_path = dir.path().join("smtp.csv");
    fs::write(
        &csv_path,
        "email,appPassword\ngood@test.com,secret\nbad-row@test.com,\n",
    )
    .unwrap();

    let pool = SmtpPool::load(&csv_path, stats).await.unwrap();
    assert_eq!(pool.available_count(), 1);

    let selected = pool.select_next().await.unwrap().unwrap();
    assert_eq!(selected.email, "good@test.com");
    assert_eq!(selected.sent_count, 0);
}
