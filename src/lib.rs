// Library exports for Inkwell
// The binary and the integration tests both build the app from here.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::db::{BlogStore, MemoryStore, SqliteStore};

/// Open the store selected by the configuration, migrating SQLite first.
pub fn open_store(config: &Config) -> anyhow::Result<Arc<dyn BlogStore>> {
    match config.database.backend {
        StorageBackend::Sqlite => {
            let db_path = config.db_path();
            tracing::info!("Database: {}", db_path.display());
            let pool = db::create_pool(&db_path)?;
            db::run_migrations(&pool)?;
            Ok(Arc::new(SqliteStore::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
