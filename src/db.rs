//! Connection pool setup and schema management.

use crate::config::AppConfig;
use crate::migrator::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub type DbPool = DatabaseConnection;

/// Pool tuning, usually derived from [`AppConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
    /// Let sqlx log every statement
    pub log_statements: bool,
}

impl DbConfig {
    /// Backend name for logs; the URL itself may carry credentials.
    fn backend(&self) -> &str {
        self.url.split(':').next().unwrap_or("unknown")
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .sqlx_logging(self.log_statements);
        options
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
            log_statements: cfg.log_level().eq_ignore_ascii_case("trace"),
        }
    }
}

/// Opens a pool with explicit tuning.
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, DbErr> {
    info!(
        backend = config.backend(),
        max_connections = config.max_connections,
        "connecting to database"
    );

    Database::connect(config.connect_options())
        .await
        .map_err(|e| {
            error!(error = %e, backend = config.backend(), "database connection failed");
            e
        })
}

/// Opens a pool tuned by the application settings.
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, DbErr> {
    establish_connection_with_config(&DbConfig::from(cfg)).await
}

/// Creates or upgrades the `marca` and `modelo` tables.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    let started = Instant::now();
    match Migrator::up(pool, None).await {
        Ok(()) => {
            info!(elapsed = ?started.elapsed(), "schema is up to date");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, elapsed = ?started.elapsed(), "migrations failed");
            Err(e)
        }
    }
}

/// Round-trips a ping; used by `/health`.
pub async fn check_connection(pool: &DbPool) -> Result<(), DbErr> {
    let started = Instant::now();
    pool.ping().await?;
    debug!(elapsed = ?started.elapsed(), "database ping");
    Ok(())
}

pub async fn close_pool(pool: DbPool) -> Result<(), DbErr> {
    debug!("closing database pool");
    pool.close().await
}
