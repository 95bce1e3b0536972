use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::JsonDocumentStore;

use crate::models::DirectoryDocument;

pub type DirectoryStore = JsonDocumentStore<DirectoryDocument>;

/// Shared by every handler: configuration plus the one store instance, so
/// all writes in the process go through the same lock.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<DirectoryStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(DirectoryStore::new(config.data_file.clone()));
        Self { config, store }
    }
}
