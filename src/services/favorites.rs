use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::{FavoriteMovie, FavoritesEvent},
    storage::{KeyValueStore, FAVORITES_KEY},
};

/// Capacity of the change-notification channel; slow subscribers past this lag
const EVENT_CAPACITY: usize = 64;

/// Owner of the persisted favorites collection
///
/// The in-memory list is the source of truth for every reader in the
/// process. Each mutation serializes the whole list and writes it through to
/// the backend before committing it in memory, then notifies subscribers.
/// The collection never holds two entries with the same movie id.
#[derive(Clone)]
pub struct FavoritesStore {
    backend: Arc<dyn KeyValueStore>,
    favorites: Arc<RwLock<Vec<FavoriteMovie>>>,
    events: broadcast::Sender<FavoritesEvent>,
}

impl FavoritesStore {
    /// Loads the persisted collection from the backend
    ///
    /// A missing key is an empty collection. A value that does not parse is
    /// reported as a storage error rather than silently discarded.
    pub async fn load(backend: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let favorites = match backend.get(FAVORITES_KEY).await? {
            Some(json) => serde_json::from_str::<Vec<FavoriteMovie>>(&json).map_err(|e| {
                tracing::error!(error = %e, backend = backend.name(), "Corrupt favorites data");
                AppError::Storage(format!("Favorites deserialization error: {}", e))
            })?,
            None => Vec::new(),
        };

        tracing::info!(
            count = favorites.len(),
            backend = backend.name(),
            "Loaded favorites"
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            backend,
            favorites: Arc::new(RwLock::new(favorites)),
            events,
        })
    }

    /// All favorites in insertion order
    pub async fn list(&self) -> Vec<FavoriteMovie> {
        self.favorites.read().await.clone()
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.favorites.read().await.iter().any(|fav| fav.id == id)
    }

    /// Appends a favorite; returns `false` without writing if the id is already saved
    pub async fn add(&self, favorite: FavoriteMovie) -> AppResult<bool> {
        let mut favorites = self.favorites.write().await;
        if favorites.iter().any(|fav| fav.id == favorite.id) {
            return Ok(false);
        }

        let mut updated = favorites.clone();
        updated.push(favorite.clone());
        self.persist(&updated).await?;
        *favorites = updated;

        tracing::info!(movie_id = favorite.id, "Favorite added");
        self.publish(FavoritesEvent::Added { favorite });

        Ok(true)
    }

    /// Removes a favorite by id; returns `false` without writing if it was not saved
    pub async fn remove(&self, id: u64) -> AppResult<bool> {
        let mut favorites = self.favorites.write().await;
        if !favorites.iter().any(|fav| fav.id == id) {
            return Ok(false);
        }

        let updated: Vec<FavoriteMovie> =
            favorites.iter().filter(|fav| fav.id != id).cloned().collect();
        self.persist(&updated).await?;
        *favorites = updated;

        tracing::info!(movie_id = id, "Favorite removed");
        self.publish(FavoritesEvent::Removed { id });

        Ok(true)
    }

    /// Adds the favorite if absent, removes it if present
    ///
    /// The membership check and the write happen under one lock, so
    /// concurrent toggles of the same movie alternate cleanly. Returns whether
    /// the movie is a favorite afterwards.
    pub async fn toggle(&self, favorite: FavoriteMovie) -> AppResult<bool> {
        let mut favorites = self.favorites.write().await;
        let id = favorite.id;
        let present = favorites.iter().any(|fav| fav.id == id);

        let updated: Vec<FavoriteMovie> = if present {
            favorites.iter().filter(|fav| fav.id != id).cloned().collect()
        } else {
            let mut updated = favorites.clone();
            updated.push(favorite.clone());
            updated
        };
        self.persist(&updated).await?;
        *favorites = updated;

        if present {
            tracing::info!(movie_id = id, "Favorite toggled off");
            self.publish(FavoritesEvent::Removed { id });
        } else {
            tracing::info!(movie_id = id, "Favorite toggled on");
            self.publish(FavoritesEvent::Added { favorite });
        }

        Ok(!present)
    }

    /// Removes every favorite and deletes the persisted key
    ///
    /// Returns how many favorites were removed. Clearing an empty collection
    /// still deletes the key but publishes nothing.
    pub async fn clear(&self) -> AppResult<usize> {
        let mut favorites = self.favorites.write().await;

        self.backend.delete(FAVORITES_KEY).await.map_err(|e| {
            tracing::error!(error = %e, backend = self.backend.name(), "Failed to clear favorites");
            e
        })?;

        let removed = favorites.len();
        favorites.clear();

        if removed > 0 {
            tracing::info!(count = removed, "Favorites cleared");
            self.publish(FavoritesEvent::Cleared);
        }

        Ok(removed)
    }

    /// Subscribes to changes made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<FavoritesEvent> {
        self.events.subscribe()
    }

    async fn persist(&self, favorites: &[FavoriteMovie]) -> AppResult<()> {
        let json = serde_json::to_string(favorites)
            .map_err(|e| AppError::Internal(format!("Favorites serialization error: {}", e)))?;

        self.backend.set(FAVORITES_KEY, json).await.map_err(|e| {
            tracing::error!(error = %e, backend = self.backend.name(), "Failed to persist favorites");
            e
        })
    }

    fn publish(&self, event: FavoritesEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}
