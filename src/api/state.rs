use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    services::{search::DEFAULT_SETTLE_DELAY, FavoritesStore, MovieProvider},
};

const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MovieProvider>,
    pub favorites: FavoritesStore,
    /// Image CDN base used when building poster and profile URLs
    pub image_base_url: String,
    /// Settle delay for live-search sessions
    pub search_settle_delay: Duration,
}

impl AppState {
    pub fn new(provider: Arc<dyn MovieProvider>, favorites: FavoritesStore) -> Self {
        Self {
            provider,
            favorites,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            search_settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Applies the configurable parts of the state
    pub fn with_config(mut self, config: &Config) -> Self {
        self.image_base_url = config.tmdb_image_url.trim_end_matches('/').to_string();
        self.search_settle_delay = config.search_settle_delay();
        self
    }
}
