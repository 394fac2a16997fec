use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;

use super::KeyValueStore;
use crate::error::AppResult;

/// Prefix applied to every key so the catalog can share a Redis instance
const KEY_NAMESPACE: &str = "catalog";

/// Creates a Redis client
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Redis-backed store
///
/// Values are written without expiry; they live until explicitly deleted.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects to Redis and verifies the connection
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = create_redis_client(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        tracing::info!("Connected to Redis");

        Ok(Self { conn })
    }

    fn namespaced(key: &str) -> String {
        format!("{}:{}", KEY_NAMESPACE, key)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(Self::namespaced(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(Self::namespaced(key), value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::namespaced(key)).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
