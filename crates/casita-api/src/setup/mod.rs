//! Application setup and initialization
//!
//! Wiring extracted from main.rs: configuration validation, backend
//! selection, and router construction.

pub mod routes;
pub mod server;

use anyhow::{Context, Result};
use casita_core::{Config, ItemsBackend};
use casita_db::{ItemRepository, JsonFileRepository, PgItemRepository};
use casita_storage::create_media_store;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

/// Initialize the entire application: validate config, connect the item
/// repository and media store, and build the router.
pub async fn initialize_app(config: Config) -> Result<(AppState, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let items = setup_repository(&config).await?;
    let media = create_media_store(&config)
        .await
        .context("Failed to initialize media store")?;

    tracing::info!(
        items_backend = ?config.items_backend,
        media_backend = ?config.media_backend,
        "Backends initialized"
    );

    let state = AppState {
        config: config.clone(),
        items,
        media,
    };

    let router = routes::build_router(&config, state.clone());

    Ok((state, router))
}

async fn setup_repository(config: &Config) -> Result<Arc<dyn ItemRepository>> {
    match config.items_backend {
        ItemsBackend::JsonFile => {
            let repo = JsonFileRepository::new(config.data_file.clone())
                .await
                .context("Failed to open item data file")?;
            Ok(Arc::new(repo))
        }
        ItemsBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required when ITEMS_BACKEND=postgres")?;

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(5))
                .connect(url)
                .await
                .context("Failed to connect to database")?;

            casita_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            Ok(Arc::new(PgItemRepository::new(pool)))
        }
    }
}
