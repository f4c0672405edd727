//! IntelloTask
//!
//! Task management data layer: users, tasks and comments persisted as JSON collections in a
//! key-value store, with role-scoped dashboard and report views computed on demand.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod reports;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::{DataService, SqliteStorage};
use errors::AppError;

/// Install the global tracing subscriber. Later calls are ignored.
pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Open the SQLite-backed store described by `config`, seeding demo data if enabled.
pub async fn bootstrap(config: &Config) -> Result<DataService<SqliteStorage>, AppError> {
    tracing::info!("Starting IntelloTask data service");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Corrupt collection policy: {}", config.on_corrupt.as_str());

    let pool = db::init_database(&config.db_path).await?;
    let store = DataService::from_config(SqliteStorage::new(pool), config);

    if config.seed_demo_data {
        let seeded = store.initialize().await?;
        if !seeded.is_empty() {
            tracing::info!("Seeded {} collection(s) with demo data", seeded.len());
        }
    }

    Ok(store)
}
