use std::sync::Arc;

use mograph_db::{CatalogFile, CatalogStore, MediaStore, StoreError};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already a handle).
#[derive(Clone)]
pub struct AppState {
    /// Single-writer handle to the catalog document.
    pub catalog: CatalogStore,
    /// Uploaded attachments under the public root.
    pub media: MediaStore,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Open the catalog (creating it as `[]` if absent) and wire up storage.
    pub async fn open(config: ServerConfig) -> Result<Self, StoreError> {
        let catalog = CatalogStore::open(CatalogFile::new(&config.catalog_file)).await?;
        let media = MediaStore::new(&config.public_root);
        Ok(Self {
            catalog,
            media,
            config: Arc::new(config),
        })
    }
}
