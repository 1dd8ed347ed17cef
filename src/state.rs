//! Shared application state.

use std::sync::Arc;

use crate::application::services::MappingResolver;
use crate::domain::repositories::MappingStore;
use crate::infrastructure::cache::CacheService;
use crate::utils::short_url::PublicSite;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<MappingResolver>,
    pub store: Arc<dyn MappingStore>,
    pub cache: Arc<dyn CacheService>,
    pub site: PublicSite,
    /// Redirect requests whose `Host` is not the public site.
    pub enforce_host: bool,
    /// Bearer token for `/api/*`. Admin routes are not mounted when `None`.
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        resolver: Arc<MappingResolver>,
        store: Arc<dyn MappingStore>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        let site = resolver.site().clone();
        Self {
            resolver,
            store,
            cache,
            site,
            enforce_host: true,
            admin_token: None,
        }
    }

    pub fn with_host_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_host = enforce;
        self
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.filter(|t| !t.is_empty()).map(Arc::from);
        self
    }
}
