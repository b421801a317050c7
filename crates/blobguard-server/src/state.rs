use std::sync::Arc;
use std::time::Duration;

use blobguard_gate::{AccessGuard, PathResolver};
use blobguard_store::{BlobStore, LocalBlobStore};

use crate::auth::{AnonymousAuth, AuthProvider, StaticTokenAuth};
use crate::catalog::CatalogFile;
use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Shared, read-only handles every request is served with.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PathResolver>,
    pub guard: AccessGuard,
    pub blobs: Arc<dyn BlobStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub route_prefix: String,
    pub legacy_prefix: Option<String>,
    pub first_byte_timeout: Option<Duration>,
}

impl AppState {
    /// Compose explicit collaborators with the routing settings of `config`.
    pub fn new(
        config: &ServerConfig,
        guard: AccessGuard,
        blobs: Arc<dyn BlobStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            resolver: Arc::new(PathResolver::new(config.guarded_namespace.clone())),
            guard,
            blobs,
            auth,
            route_prefix: config.route_prefix.clone(),
            legacy_prefix: config.legacy_prefix.clone(),
            first_byte_timeout: config.first_byte_timeout(),
        }
    }

    /// Build the standard deployment: local disk blobs, catalog file
    /// metadata, and static bearer tokens.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => CatalogFile::from_json_file(path)?,
            None => CatalogFile::default(),
        };
        let (objects, documents) = catalog.into_collaborators();
        let guard = AccessGuard::new(Arc::new(objects), Arc::new(documents));
        let blobs = Arc::new(LocalBlobStore::new(&config.storage_root));
        let auth: Arc<dyn AuthProvider> = if config.tokens.is_empty() {
            Arc::new(AnonymousAuth)
        } else {
            Arc::new(StaticTokenAuth::new(config.tokens.clone()))
        };
        Ok(Self::new(config, guard, blobs, auth))
    }
}
