//! Durable key-value backends
//!
//! Persisted client state (currently only the favorites collection) is kept
//! as serialized strings under fixed keys, the same way a browser keeps it in
//! local storage. The backend is picked at startup from configuration.

use std::sync::Arc;

use crate::{config::Config, error::AppResult};

pub mod file;
pub mod memory;
pub mod redis;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

/// Key holding the serialized favorites list
pub const FAVORITES_KEY: &str = "movie_favorites";

/// String key-value store that survives restarts
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when it was never set
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Replaces the value stored under `key`
    async fn set(&self, key: &str, value: String) -> AppResult<()>;

    /// Removes `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Builds the backend selected by the configuration
///
/// Redis is used when `REDIS_URL` is set, otherwise a JSON file on disk.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(redis_url) => Arc::new(RedisStore::connect(redis_url).await?),
        None => Arc::new(FileStore::new(&config.favorites_path)),
    };

    tracing::info!(backend = store.name(), "Opened favorites storage");

    Ok(store)
}
