use std::sync::Arc;

use movie_catalog::{
    api::{create_router, AppState},
    config::Config,
    services::{FavoritesStore, TmdbProvider},
    storage,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_catalog=info,tower_http=info")),
        )
        .init();

    let provider = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let backend = storage::open_store(&config).await?;
    let favorites = FavoritesStore::load(backend).await?;

    let state = AppState::new(provider, favorites).with_config(&config);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app).await?;

    Ok(())
}
