use crate::{
    error::AppResult,
    models::{MovieDetails, MovieList, MoviePage},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Movie metadata provider abstraction
///
/// The catalog only reads from the remote API: paginated lists, single-movie
/// details and free-text search. Implementations must be shareable across
/// tasks since a single provider serves every request and search session.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Fetch one page of a catalog list
    async fn list_movies(&self, list: MovieList, page: u32) -> AppResult<MoviePage>;

    /// Fetch full details for one movie
    ///
    /// With `include_credits` the cast and similar titles are embedded in the
    /// same response.
    async fn movie_details(&self, id: u64, include_credits: bool) -> AppResult<MovieDetails>;

    /// Search movies by free-text query
    ///
    /// Blank queries are rejected with `InvalidInput` without a remote call.
    async fn search_movies(&self, query: &str, page: u32) -> AppResult<MoviePage>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
