use std::{str::FromStr, time::Duration};

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    PgPool,
};

use crate::config::{ConfigError, DbConfig};

#[derive(Debug, thiserror::Error)]
pub enum DbInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub fn connect_options(cfg: &DbConfig) -> Result<PgConnectOptions, ConfigError> {
    let ssl_mode = PgSslMode::from_str(&cfg.ssl_mode).map_err(|_| ConfigError::Invalid {
        key: "DB_SSL_MODE",
        value: cfg.ssl_mode.clone(),
    })?;

    Ok(PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.username)
        .password(&cfg.password)
        .database(&cfg.name)
        .ssl_mode(ssl_mode))
}

/// Bounded pool with migrations applied.
pub async fn connect(cfg: &DbConfig) -> Result<PgPool, DbInitError> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .idle_timeout(Duration::from_secs(cfg.max_idle_minutes * 60))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_hours * 60 * 60))
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options(cfg)?)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(host = %cfg.host, database = %cfg.name, "database ready");

    Ok(pool)
}
