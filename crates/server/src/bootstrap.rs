use chrono::Utc;
use thiserror::Error;
use tracing::info;
use voicequote_core::config::{AppConfig, ConfigError, LoadOptions};
use voicequote_db::{connect_with_settings, fixtures, migrations, DbPool};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("default pricing seed failed: {0}")]
    Seed(#[source] sqlx::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    // Every new submission reads its price from the sentinel row, so
    // it must exist before the first request. Seeding never clobbers
    // a price an operator has already set.
    let created =
        fixtures::ensure_default_pricing(&db_pool, config.pricing.default_cost_per_minute, Utc::now())
            .await
            .map_err(BootstrapError::Seed)?;
    info!(
        event_name = "system.bootstrap.default_pricing_ready",
        correlation_id = "bootstrap",
        created,
        cost_per_minute = %config.pricing.default_cost_per_minute,
        "default pricing record ready"
    );

    Ok(Application { config, db_pool })
}
