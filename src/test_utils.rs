//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database, a settings store and a bot
//! host, plus tracing output that plays nicely with `cargo test`.

use crate::{
    bot::BotHost,
    config::database::create_tables,
    core::SettingsStore,
    errors::Result,
};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once per test binary.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// A settings store backed by a fresh in-memory database.
pub async fn setup_test_store() -> Result<SettingsStore> {
    Ok(SettingsStore::new(setup_test_db().await?))
}

/// A bot host with an empty store, no extensions and UTC as its timezone.
pub async fn setup_test_host() -> Result<BotHost> {
    Ok(BotHost::new(setup_test_store().await?, Tz::UTC))
}
