//! TMDB (The Movie Database) v3 API provider
//!
//! Every request carries the API key as the `api_key` query parameter.
//!
//! Endpoints used:
//! 1. Lists: /movie/{popular|top_rated|now_playing|upcoming}?page=N
//! 2. Details: /movie/{id}?append_to_response=credits,similar
//! 3. Search: /search/movie?query=...&page=N

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetails, MovieList, MoviePage},
    services::providers::MovieProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

/// Extra sections embedded in a details response when credits are requested
const DETAILS_APPEND: &str = "credits,similar";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// TMDB pages are 1-based; page 0 is rejected upstream
    fn page_param(page: u32) -> String {
        page.max(1).to_string()
    }

    /// Issues a GET against the API and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.endpoint(path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource {}", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                response = %response_text,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn list_movies(&self, list: MovieList, page: u32) -> AppResult<MoviePage> {
        let path = format!("/movie/{}", list.path_segment());
        let movies: MoviePage = self
            .get_json(&path, &[("page", Self::page_param(page))])
            .await?;

        tracing::info!(
            list = %list,
            page = movies.page,
            results = movies.results.len(),
            provider = "tmdb",
            "Movie list fetched"
        );

        Ok(movies)
    }

    async fn movie_details(&self, id: u64, include_credits: bool) -> AppResult<MovieDetails> {
        let path = format!("/movie/{}", id);
        let mut params = Vec::new();
        if include_credits {
            params.push(("append_to_response", DETAILS_APPEND.to_string()));
        }

        let details: MovieDetails = self.get_json(&path, &params).await?;

        tracing::info!(
            movie_id = id,
            credits = include_credits,
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details)
    }

    async fn search_movies(&self, query: &str, page: u32) -> AppResult<MoviePage> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let movies: MoviePage = self
            .get_json(
                "/search/movie",
                &[
                    ("query", query.to_string()),
                    ("page", Self::page_param(page)),
                ],
            )
            .await?;

        tracing::info!(
            query = %query,
            page = movies.page,
            results = movies.results.len(),
            provider = "tmdb",
            "Movie search completed"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
