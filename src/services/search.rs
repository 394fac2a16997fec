//! Debounced, paginated movie search
//!
//! A [`SearchSession`] belongs to one view (one live-search connection). Each
//! call to [`SearchSession::input`] restarts a settle timer; the remote search
//! only fires once the input has been quiet for the whole settle delay.
//! Results are published through a `watch` channel so the owner can render
//! every state change.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{models::Movie, services::providers::MovieProvider};

/// Settle delay used when none is configured
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// No query, nothing shown
    Idle,
    /// Waiting for input to settle
    Pending,
    /// A request is in flight
    Loading,
    Loaded,
    /// The last request failed; results were cleared
    Failed,
}

/// Snapshot of a search session, as shown to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub movies: Vec<Movie>,
    pub page: u32,
    pub total_pages: u32,
    pub status: SearchStatus,
    /// Whether a non-blank query has been sent since the last clear
    pub has_searched: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            movies: Vec::new(),
            page: 1,
            total_pages: 0,
            status: SearchStatus::Idle,
            has_searched: false,
        }
    }
}

impl SearchState {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    fn is_busy(&self) -> bool {
        matches!(self.status, SearchStatus::Pending | SearchStatus::Loading)
    }
}

struct Control {
    /// Bumped by every input and by teardown; responses from older generations are dropped
    generation: u64,
    /// Settle timer of the latest input, if it has not fired yet
    pending: Option<JoinHandle<()>>,
}

struct Inner {
    provider: Arc<dyn MovieProvider>,
    settle_delay: Duration,
    control: Mutex<Control>,
    state: watch::Sender<SearchState>,
}

impl Inner {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches one page and folds it into the state unless superseded
    async fn fetch(self: Arc<Self>, query: String, page: u32, generation: u64) {
        {
            let control = self.control();
            if control.generation != generation {
                return;
            }
            self.state.send_modify(|state| {
                state.status = SearchStatus::Loading;
                state.has_searched = true;
            });
        }

        let result = self.provider.search_movies(&query, page).await;

        let control = self.control();
        if control.generation != generation {
            tracing::debug!(
                query = %query,
                page = page,
                "Discarding superseded search response"
            );
            return;
        }

        match result {
            Ok(results) => {
                tracing::debug!(
                    query = %query,
                    page = page,
                    results = results.results.len(),
                    total_pages = results.total_pages,
                    "Search results received"
                );
                self.state.send_modify(|state| {
                    if page == 1 {
                        state.movies = results.results;
                    } else {
                        state.movies.extend(results.results);
                    }
                    state.page = page;
                    state.total_pages = results.total_pages;
                    state.status = SearchStatus::Loaded;
                });
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    query = %query,
                    page = page,
                    provider = self.provider.name(),
                    "Error searching movies"
                );
                self.state.send_modify(|state| {
                    state.movies.clear();
                    state.total_pages = 0;
                    state.status = SearchStatus::Failed;
                });
            }
        }
    }
}

/// Debounced search bound to one owner
///
/// Must be used from within a Tokio runtime. Dropping the session (or calling
/// [`SearchSession::close`]) cancels the pending settle timer; a request
/// already in flight is left to finish but its result is ignored.
pub struct SearchSession {
    inner: Arc<Inner>,
}

impl SearchSession {
    pub fn new(provider: Arc<dyn MovieProvider>, settle_delay: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());

        Self {
            inner: Arc::new(Inner {
                provider,
                settle_delay,
                control: Mutex::new(Control {
                    generation: 0,
                    pending: None,
                }),
                state,
            }),
        }
    }

    /// Records new input and restarts the settle timer
    ///
    /// Blank input clears the results immediately and issues no request.
    pub fn input(&self, query: &str) {
        let query = query.to_string();
        let mut control = self.inner.control();

        control.generation += 1;
        let generation = control.generation;
        if let Some(pending) = control.pending.take() {
            pending.abort();
        }

        if query.trim().is_empty() {
            self.inner.state.send_modify(|state| {
                *state = SearchState {
                    query,
                    ..SearchState::default()
                };
            });
            return;
        }

        self.inner.state.send_modify(|state| {
            state.query = query.clone();
            state.page = 1;
            state.total_pages = 0;
            state.status = SearchStatus::Pending;
        });

        let inner = Arc::clone(&self.inner);
        control.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.settle_delay).await;
            // Detached so that later input cancels only the timer, never the request
            tokio::spawn(inner.fetch(query, 1, generation));
        }));
    }

    /// Requests the next page of the current query
    ///
    /// Returns `false` when there is no further page, nothing is shown yet, the
    /// last request failed, or a request is already pending or in flight.
    pub fn load_more(&self) -> bool {
        let control = self.inner.control();
        let state = self.inner.state.borrow().clone();

        if state.is_busy()
            || state.status == SearchStatus::Failed
            || state.movies.is_empty()
            || !state.has_more()
        {
            return false;
        }

        let next_page = state.page + 1;
        self.inner
            .state
            .send_modify(|state| state.status = SearchStatus::Loading);

        tokio::spawn(Arc::clone(&self.inner).fetch(state.query, next_page, control.generation));

        true
    }

    /// Current state snapshot
    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Tears the session down; equivalent to dropping it
    pub fn close(self) {}
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        let mut control = self.inner.control();
        control.generation += 1;
        if let Some(pending) = control.pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{AppError, AppResult},
        models::{MovieDetails, MovieList, MoviePage},
    };
    use std::collections::HashMap;

    const SETTLE: Duration = Duration::from_millis(500);
    const PER_PAGE: u64 = 2;

    /// Provider recording every search call
    #[derive(Default)]
    struct FakeProvider {
        calls: Mutex<Vec<(String, u32)>>,
        delays: HashMap<String, Duration>,
        failing: Vec<String>,
        total_pages: u32,
    }

    impl FakeProvider {
        fn with_pages(total_pages: u32) -> Self {
            Self {
                total_pages,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: String::new(),
            vote_average: 5.0,
            vote_count: 1,
            genre_ids: None,
        }
    }

    #[async_trait::async_trait]
    impl MovieProvider for FakeProvider {
        async fn list_movies(&self, _list: MovieList, _page: u32) -> AppResult<MoviePage> {
            Err(AppError::Internal("not used".to_string()))
        }

        async fn movie_details(&self, _id: u64, _credits: bool) -> AppResult<MovieDetails> {
            Err(AppError::Internal("not used".to_string()))
        }

        async fn search_movies(&self, query: &str, page: u32) -> AppResult<MoviePage> {
            self.calls.lock().unwrap().push((query.to_string(), page));

            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.iter().any(|q| q == query) {
                return Err(AppError::ExternalApi("TMDB returned 500".to_string()));
            }

            let first_id = u64::from(page) * 100;
            Ok(MoviePage {
                page,
                results: (0..PER_PAGE).map(|n| movie(first_id + n, query)).collect(),
                total_pages: self.total_pages,
                total_results: u64::from(self.total_pages) * PER_PAGE,
            })
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn session(provider: &Arc<FakeProvider>) -> SearchSession {
        SearchSession::new(provider.clone(), SETTLE)
    }

    async fn settle() {
        tokio::time::sleep(SETTLE * 4).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_fires_once_with_final_query() {
        let provider = Arc::new(FakeProvider::with_pages(1));
        let search = session(&provider);
        let mut rx = search.subscribe();

        for query in ["m", "ma", "mat", "matrix"] {
            search.input(query);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        rx.wait_for(|s| s.status == SearchStatus::Loaded)
            .await
            .unwrap();
        settle().await;

        assert_eq!(provider.calls(), vec![("matrix".to_string(), 1)]);
        assert!(search.state().movies.iter().all(|m| m.title == "matrix"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_request_before_settle_delay() {
        let provider = Arc::new(FakeProvider::with_pages(1));
        let search = session(&provider);

        search.input("dune");
        tokio::time::sleep(SETTLE - Duration::from_millis(50)).await;

        assert!(provider.calls().is_empty());
        assert_eq!(search.state().status, SearchStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_clears_without_request() {
        let provider = Arc::new(FakeProvider::with_pages(1));
        let search = session(&provider);
        let mut rx = search.subscribe();

        search.input("alien");
        rx.wait_for(|s| s.status == SearchStatus::Loaded)
            .await
            .unwrap();
        assert!(!search.state().movies.is_empty());

        search.input("   ");
        settle().await;

        let state = search.state();
        assert!(state.movies.is_empty());
        assert!(!state.has_searched);
        assert_eq!(state.status, SearchStatus::Idle);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_cancels_pending_search() {
        let provider = Arc::new(FakeProvider::with_pages(1));
        let search = session(&provider);

        search.input("alien");
        search.input("");
        settle().await;

        assert!(provider.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_appends_and_new_query_replaces() {
        let provider = Arc::new(FakeProvider::with_pages(2));
        let search = session(&provider);
        let mut rx = search.subscribe();

        search.input("star");
        rx.wait_for(|s| s.status == SearchStatus::Loaded)
            .await
            .unwrap();
        assert_eq!(search.state().movies.len(), 2);

        assert!(search.load_more());
        assert!(!search.load_more());
        rx.wait_for(|s| s.status == SearchStatus::Loaded && s.page == 2)
            .await
            .unwrap();

        let state = search.state();
        assert_eq!(state.movies.len(), 4);
        assert_eq!(state.movies[0].id, 100);
        assert_eq!(state.movies[2].id, 200);
        assert!(!state.has_more());
        assert!(!search.load_more());

        search.input("trek");
        rx.wait_for(|s| s.status == SearchStatus::Loaded && s.query == "trek")
            .await
            .unwrap();

        let state = search.state();
        assert_eq!(state.page, 1);
        assert_eq!(state.movies.len(), 2);
        assert!(state.movies.iter().all(|m| m.title == "trek"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_ignored_before_any_search() {
        let provider = Arc::new(FakeProvider::with_pages(5));
        let search = session(&provider);

        assert!(!search.load_more());
        search.input("pending");
        assert!(!search.load_more());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_results_without_retry() {
        let provider = Arc::new(FakeProvider {
            failing: vec!["boom".to_string()],
            ..FakeProvider::with_pages(1)
        });
        let search = session(&provider);
        let mut rx = search.subscribe();

        search.input("fine");
        rx.wait_for(|s| s.status == SearchStatus::Loaded)
            .await
            .unwrap();

        search.input("boom");
        rx.wait_for(|s| s.status == SearchStatus::Failed)
            .await
            .unwrap();
        settle().await;

        let state = search.state();
        assert!(state.movies.is_empty());
        assert!(state.has_searched);
        assert_eq!(
            provider.calls(),
            vec![("fine".to_string(), 1), ("boom".to_string(), 1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_refused_after_first_page_failed() {
        let provider = Arc::new(FakeProvider {
            failing: vec!["boom".to_string()],
            ..FakeProvider::with_pages(5)
        });
        let search = session(&provider);
        let mut rx = search.subscribe();

        search.input("fine");
        rx.wait_for(|s| s.status == SearchStatus::Loaded)
            .await
            .unwrap();
        assert!(search.state().has_more());

        search.input("boom");
        assert_eq!(search.state().total_pages, 0);
        rx.wait_for(|s| s.status == SearchStatus::Failed)
            .await
            .unwrap();

        assert!(!search.load_more());
        settle().await;

        let state = search.state();
        assert_eq!(state.total_pages, 0);
        assert!(!state.has_more());
        assert_eq!(
            provider.calls(),
            vec![("fine".to_string(), 1), ("boom".to_string(), 1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_does_not_overwrite_newer_results() {
        let mut delays = HashMap::new();
        delays.insert("slow".to_string(), Duration::from_secs(2));
        let provider = Arc::new(FakeProvider {
            delays,
            ..FakeProvider::with_pages(1)
        });
        let search = session(&provider);
        let mut rx = search.subscribe();

        search.input("slow");
        rx.wait_for(|s| s.status == SearchStatus::Loading)
            .await
            .unwrap();

        search.input("fast");
        rx.wait_for(|s| s.status == SearchStatus::Loaded)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        let state = search.state();
        assert_eq!(state.query, "fast");
        assert!(state.movies.iter().all(|m| m.title == "fast"));
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let provider = Arc::new(FakeProvider::with_pages(1));
        let search = session(&provider);

        search.input("never sent");
        drop(search);
        settle().await;

        assert!(provider.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_pending_timer() {
        let provider = Arc::new(FakeProvider::with_pages(1));
        let search = session(&provider);

        search.input("never sent");
        search.close();
        settle().await;

        assert!(provider.calls().is_empty());
    }
}
