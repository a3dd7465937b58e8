//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::routing::{SiteCache, SiteResolver};
use crate::store::SiteStore;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn SiteStore>,
    pub resolver: Arc<SiteResolver>,
}

impl AppState {
    /// Wire the resolver to the store with a fresh, state-owned cache.
    pub fn new(config: Config, store: Arc<dyn SiteStore>) -> Self {
        let resolver = Arc::new(SiteResolver::new(
            store.clone(),
            Arc::new(SiteCache::new()),
            config.default_site_id,
        ));
        Self {
            config: Arc::new(config),
            store,
            resolver,
        }
    }
}
