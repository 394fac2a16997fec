use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, live_search, AppState};
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/movies/home", get(handlers::home))
        .route("/movies/lists/:list", get(handlers::list_movies))
        .route("/movies/:id", get(handlers::movie_details))
        .route("/images", get(handlers::image))
        // Search
        .route("/search", get(handlers::search))
        .route("/search/live", get(live_search::live_search))
        // Favorites
        .route(
            "/favorites",
            get(handlers::list_favorites)
                .post(handlers::add_favorite)
                .delete(handlers::clear_favorites),
        )
        .route("/favorites/toggle", post(handlers::toggle_favorite))
        .route("/favorites/events", get(handlers::favorite_events))
        .route(
            "/favorites/:id",
            get(handlers::favorite_status).delete(handlers::remove_favorite),
        )
}
