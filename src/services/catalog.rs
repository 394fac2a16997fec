use serde::Serialize;

use crate::{
    models::{Movie, MovieList},
    services::providers::MovieProvider,
};

/// First page of one catalog list on the home screen
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HomeSection {
    pub list: MovieList,
    pub movies: Vec<Movie>,
    pub page: u32,
    pub total_pages: u32,
    /// Set when this list failed to load; the section is then empty
    pub failed: bool,
}

/// Fetches the first page of every catalog list concurrently
///
/// Lists fail independently: a list whose request errors comes back as an
/// empty section flagged `failed`, and the others are unaffected. Sections
/// are returned in `MovieList::ALL` order.
pub async fn load_home(provider: &dyn MovieProvider) -> Vec<HomeSection> {
    let (popular, top_rated, now_playing, upcoming) = tokio::join!(
        provider.list_movies(MovieList::Popular, 1),
        provider.list_movies(MovieList::TopRated, 1),
        provider.list_movies(MovieList::NowPlaying, 1),
        provider.list_movies(MovieList::Upcoming, 1),
    );

    let results = [popular, top_rated, now_playing, upcoming];
    let mut sections = Vec::with_capacity(results.len());
    let mut error_count = 0;

    for (list, result) in MovieList::ALL.into_iter().zip(results) {
        match result {
            Ok(page) => sections.push(HomeSection {
                list,
                movies: page.results,
                page: page.page,
                total_pages: page.total_pages,
                failed: false,
            }),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    list = %list,
                    provider = provider.name(),
                    "Error loading movie list"
                );
                error_count += 1;
                sections.push(HomeSection {
                    list,
                    movies: Vec::new(),
                    page: 1,
                    total_pages: 0,
                    failed: true,
                });
            }
        }
    }

    if error_count > 0 {
        tracing::warn!(
            success_count = sections.len() - error_count,
            error_count = error_count,
            "Partial home feed failure"
        );
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::MoviePage,
        services::providers::MockMovieProvider,
    };

    fn page_of(list: MovieList) -> MoviePage {
        MoviePage {
            page: 1,
            results: vec![Movie {
                id: 1,
                title: list.to_string(),
                overview: String::new(),
                poster_path: None,
                backdrop_path: None,
                release_date: "2024-01-01".to_string(),
                vote_average: 6.5,
                vote_count: 10,
                genre_ids: None,
            }],
            total_pages: 10,
            total_results: 200,
        }
    }

    #[tokio::test]
    async fn test_all_lists_loaded_in_order() {
        let mut provider = MockMovieProvider::new();
        provider
            .expect_list_movies()
            .withf(|_, page| *page == 1)
            .times(4)
            .returning(|list, _| Ok(page_of(list)));
        provider.expect_name().return_const("mock");

        let sections = load_home(&provider).await;

        let lists: Vec<MovieList> = sections.iter().map(|s| s.list).collect();
        assert_eq!(lists, MovieList::ALL.to_vec());
        assert!(sections.iter().all(|s| !s.failed && s.movies.len() == 1));
        assert_eq!(sections[1].movies[0].title, "top_rated");
    }

    #[tokio::test]
    async fn test_failing_list_does_not_blank_others() {
        let mut provider = MockMovieProvider::new();
        provider
            .expect_list_movies()
            .times(4)
            .returning(|list, _| match list {
                MovieList::NowPlaying => Err(AppError::ExternalApi("TMDB returned 503".to_string())),
                other => Ok(page_of(other)),
            });
        provider.expect_name().return_const("mock");

        let sections = load_home(&provider).await;

        assert_eq!(sections.len(), 4);
        let now_playing = &sections[2];
        assert_eq!(now_playing.list, MovieList::NowPlaying);
        assert!(now_playing.failed);
        assert!(now_playing.movies.is_empty());
        assert_eq!(sections.iter().filter(|s| s.failed).count(), 1);
        assert_eq!(sections[0].total_pages, 10);
    }
}
