use std::sync::Arc;

use greenswap_core::config::{AppConfig, ConfigError, LoadOptions};
use greenswap_core::emissions::{EmissionTable, EmissionTableError};
use greenswap_core::recommend::{RecommendationEngine, RecommendationService};
use greenswap_db::{connect_with_config, migrations, DbPool, SqlProductStore};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub service: Arc<RecommendationService<SqlProductStore>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    EmissionTable(#[from] EmissionTableError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub fn load_config(options: LoadOptions) -> Result<AppConfig, BootstrapError> {
    Ok(AppConfig::load(options)?)
}

pub async fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let table =
        EmissionTable::reference_with_overrides(config.recommend.emission_table_path.as_deref())?;
    let engine =
        RecommendationEngine::new(Arc::new(table)).with_scaling(config.recommend.feature_scaling);
    info!(
        event_name = "system.bootstrap.emission_table_loaded",
        correlation_id = "bootstrap",
        categories = engine.table().categories().count(),
        scaling = ?engine.scaling(),
        "emission table loaded"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
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

    let service =
        Arc::new(RecommendationService::new(SqlProductStore::new(db_pool.clone()), engine));

    Ok(Application { config, db_pool, service })
}
