use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{image_url, FavoriteMovie, ImageSize, MovieDetails, MovieList, MoviePage},
    services::catalog::{self, HomeSection},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    /// Embed cast and similar titles; defaults to true
    pub credits: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub path: Option<String>,
    #[serde(default)]
    pub size: ImageSize,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FavoriteStatus {
    pub id: u64,
    pub favorite: bool,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// First page of every catalog list
pub async fn home(State(state): State<AppState>) -> Json<Vec<HomeSection>> {
    Json(catalog::load_home(state.provider.as_ref()).await)
}

/// One page of a catalog list
pub async fn list_movies(
    State(state): State<AppState>,
    Path(list): Path<MovieList>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<MoviePage>> {
    let page = state
        .provider
        .list_movies(list, params.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// Details for a single movie
pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(params): Query<DetailsQuery>,
) -> AppResult<Json<MovieDetails>> {
    let details = state
        .provider
        .movie_details(id, params.credits.unwrap_or(true))
        .await?;
    Ok(Json(details))
}

/// One-shot search; a blank query returns an empty page without a remote call
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<MoviePage>> {
    if params.q.trim().is_empty() {
        return Ok(Json(MoviePage::empty()));
    }

    let page = state
        .provider
        .search_movies(&params.q, params.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// Resolves an image path to a CDN URL
pub async fn image(
    State(state): State<AppState>,
    Query(params): Query<ImageQuery>,
) -> Json<ImageResponse> {
    Json(ImageResponse {
        url: image_url(&state.image_base_url, params.path.as_deref(), params.size),
    })
}

/// All favorites in insertion order
pub async fn list_favorites(State(state): State<AppState>) -> Json<Vec<FavoriteMovie>> {
    Json(state.favorites.list().await)
}

/// Saves a favorite; 201 when added, 200 when it was already saved
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(favorite): Json<FavoriteMovie>,
) -> AppResult<(StatusCode, Json<FavoriteStatus>)> {
    let id = favorite.id;
    let added = state.favorites.add(favorite).await?;

    tracing::info!(request_id = %request_id, movie_id = id, added, "Add favorite");

    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(FavoriteStatus { id, favorite: true })))
}

/// Flips favorite membership, returning the new state
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(favorite): Json<FavoriteMovie>,
) -> AppResult<Json<FavoriteStatus>> {
    let id = favorite.id;
    let is_favorite = state.favorites.toggle(favorite).await?;

    tracing::info!(
        request_id = %request_id,
        movie_id = id,
        favorite = is_favorite,
        "Toggle favorite"
    );

    Ok(Json(FavoriteStatus {
        id,
        favorite: is_favorite,
    }))
}

pub async fn favorite_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<FavoriteStatus> {
    Json(FavoriteStatus {
        id,
        favorite: state.favorites.contains(id).await,
    })
}

/// Removes a favorite; 404 when it was not saved
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<u64>,
) -> AppResult<StatusCode> {
    if !state.favorites.remove(id).await? {
        return Err(AppError::NotFound(format!("Favorite {}", id)));
    }

    tracing::info!(request_id = %request_id, movie_id = id, "Remove favorite");

    Ok(StatusCode::NO_CONTENT)
}

/// Removes every favorite
pub async fn clear_favorites(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Value>> {
    let removed = state.favorites.clear().await?;

    tracing::info!(request_id = %request_id, count = removed, "Clear favorites");

    Ok(Json(json!({ "removed": removed })))
}

/// Server-sent stream of favorites changes
pub async fn favorite_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.favorites.subscribe();

    let stream = futures_util::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match Event::default().json_data(&event) {
                    Ok(sse_event) => return Some((Ok(sse_event), receiver)),
                    Err(e) => tracing::error!(error = %e, "Failed to encode favorites event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Favorites event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
