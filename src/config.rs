use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v3 API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// TMDB image CDN base URL (without size segment)
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Redis connection URL. When set, favorites are persisted in Redis
    /// instead of the local file.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Path of the JSON file backing favorites when Redis is not configured
    #[serde(default = "default_favorites_path")]
    pub favorites_path: String,

    /// Debounce settle delay for live search, in milliseconds
    #[serde(default = "default_search_settle_ms")]
    pub search_settle_ms: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_favorites_path() -> String {
    "favorites.json".to_string()
}

fn default_search_settle_ms() -> u64 {
    500
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn search_settle_delay(&self) -> Duration {
        Duration::from_millis(self.search_settle_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
