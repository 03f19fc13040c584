use crate::backend::{UmyaBackend, WorkbookBackend};
use crate::config::ServerConfig;
use crate::paths::PathResolver;
use std::sync::Arc;

/// Shared, read-only state handed to every request.
pub struct AppState {
    config: Arc<ServerConfig>,
    resolver: PathResolver,
    backend: Arc<dyn WorkbookBackend>,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self::with_backend(config, Arc::new(UmyaBackend::new()))
    }

    pub fn with_backend(config: Arc<ServerConfig>, backend: Arc<dyn WorkbookBackend>) -> Self {
        let resolver = PathResolver::new(config.excel_root.clone());
        Self {
            config,
            resolver,
            backend,
        }
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn backend(&self) -> Arc<dyn WorkbookBackend> {
        self.backend.clone()
    }
}
