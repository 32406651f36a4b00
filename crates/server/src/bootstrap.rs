use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tracing::info;

use medquote_analysis::{HttpAnalysisClient, StaticHistoricalContextProvider};
use medquote_core::config::{AppConfig, ConfigError, LoadOptions};
use medquote_db::store::SqlQuoteStore;
use medquote_db::{connect_with_settings, migrations, DbPool};

use crate::{health, quotes};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    state: quotes::QuotesState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("analysis client initialization failed: {0}")]
    AnalysisClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let analysis =
        HttpAnalysisClient::new(&config.analysis).map_err(BootstrapError::AnalysisClient)?;
    info!(
        event_name = "system.bootstrap.analysis_client_ready",
        base_url = %config.analysis.base_url,
        timeout_secs = config.analysis.timeout_secs,
        "analysis client initialized"
    );

    let state = quotes::QuotesState {
        store: Arc::new(SqlQuoteStore::new(db_pool.clone())),
        analysis: Arc::new(analysis),
        history: Arc::new(StaticHistoricalContextProvider),
    };

    Ok(Application { config, db_pool, state })
}

impl Application {
    pub fn router(&self) -> Router {
        quotes::router(self.state.clone()).merge(health::router(self.db_pool.clone()))
    }
}

#[cfg(test)]
mod tests {
    use medquote_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn memory_options() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:?cache=shared".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_exposes_quote_schema() {
        let app = bootstrap(memory_options()).await.expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'quote'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("quote table should exist after bootstrap");
        assert_eq!(table_count, 1);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_analysis_url() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                analysis_base_url: Some("not-a-url".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("invalid analysis url should fail").to_string();
        assert!(message.contains("analysis.base_url"));
    }
}
