use std::sync::Arc;

use crate::{config::Config, database::DbPool, services::storage::FileStorageService};

/// Application state shared across all HTTP handlers
///
/// This struct contains shared resources that need to be accessed
/// by API handlers, such as the database pool and the file store.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing the database
    pub pool: DbPool,
    /// Store for uploaded workshop files
    pub storage: Arc<FileStorageService>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState instance
    ///
    /// # Arguments
    /// * `pool` - Database connection pool
    /// * `storage` - File storage service
    /// * `config` - Loaded application configuration
    pub fn new(pool: DbPool, storage: FileStorageService, config: Config) -> Self {
        Self {
            pool,
            storage: Arc::new(storage),
            config: Arc::new(config),
        }
    }
}
