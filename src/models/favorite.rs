use serde::{Deserialize, Serialize};

use super::{Movie, MovieDetails};

/// A movie the user saved locally, denormalized for offline display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
}

impl From<&Movie> for FavoriteMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
        }
    }
}

impl From<&MovieDetails> for FavoriteMovie {
    fn from(details: &MovieDetails) -> Self {
        Self::from(&details.movie)
    }
}

/// Change notification published by the favorites store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FavoritesEvent {
    Added { favorite: FavoriteMovie },
    Removed { id: u64 },
    /// Every favorite was removed at once
    Cleared,
}
