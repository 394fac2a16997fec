use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Catalog list exposed by the remote API
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovieList {
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
}

impl MovieList {
    pub const ALL: [MovieList; 4] = [
        MovieList::Popular,
        MovieList::TopRated,
        MovieList::NowPlaying,
        MovieList::Upcoming,
    ];

    /// Path segment under `/movie/` on the remote API
    pub fn path_segment(&self) -> &'static str {
        match self {
            MovieList::Popular => "popular",
            MovieList::TopRated => "top_rated",
            MovieList::NowPlaying => "now_playing",
            MovieList::Upcoming => "upcoming",
        }
    }
}

impl Display for MovieList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// A single film as returned in list and search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    /// Average rating on a 0-10 scale
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<u64>>,
}

impl Movie {
    /// Year of release, if the release date is a valid `YYYY-MM-DD` date
    pub fn release_year(&self) -> Option<i32> {
        release_year(&self.release_date)
    }
}

fn release_year(date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// One page of a paginated movie listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    #[serde(default = "first_page")]
    pub page: u32,
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

impl MoviePage {
    /// An empty first page, used where a lookup is skipped or failed
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Full details for a single film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Runtime in minutes
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<Credits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar: Option<MoviePage>,
}

impl MovieDetails {
    /// First `n` billed cast members; empty when credits were not requested
    pub fn top_cast(&self, n: usize) -> &[CastMember] {
        match &self.credits {
            Some(credits) => &credits.cast[..credits.cast.len().min(n)],
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(release_date: &str) -> Movie {
        Movie {
            id: 27205,
            title: "Inception".to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: release_date.to_string(),
            vote_average: 8.4,
            vote_count: 35000,
            genre_ids: None,
        }
    }

    #[test]
    fn test_movie_list_path_segment() {
        assert_eq!(MovieList::Popular.path_segment(), "popular");
        assert_eq!(MovieList::TopRated.path_segment(), "top_rated");
        assert_eq!(MovieList::NowPlaying.path_segment(), "now_playing");
        assert_eq!(MovieList::Upcoming.path_segment(), "upcoming");
    }

    #[test]
    fn test_movie_list_serde_matches_path_segment() {
        for list in MovieList::ALL {
            let json = serde_json::to_string(&list).unwrap();
            assert_eq!(json, format!("\"{}\"", list.path_segment()));
        }
    }

    #[test]
    fn test_release_year() {
        assert_eq!(movie("2010-07-15").release_year(), Some(2010));
        assert_eq!(movie("").release_year(), None);
        assert_eq!(movie("soon").release_year(), None);
    }

    #[test]
    fn test_movie_deserialization_tolerates_missing_fields() {
        let json = r#"{
            "id": 550,
            "title": "Fight Club",
            "poster_path": null,
            "vote_average": 8
        }"#;

        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 550);
        assert_eq!(movie.overview, "");
        assert_eq!(movie.release_date, "");
        assert_eq!(movie.vote_average, 8.0);
        assert_eq!(movie.vote_count, 0);
        assert_eq!(movie.genre_ids, None);
    }

    #[test]
    fn test_movie_details_deserialization_with_credits() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "overview": "Cobb steals secrets.",
            "poster_path": "/inception.jpg",
            "backdrop_path": null,
            "release_date": "2010-07-15",
            "vote_average": 8.369,
            "vote_count": 35000,
            "genres": [{"id": 28, "name": "Action"}],
            "runtime": 148,
            "tagline": "Your mind is the scene of the crime.",
            "credits": {
                "cast": [
                    {"id": 6193, "name": "Leonardo DiCaprio", "character": "Cobb", "profile_path": "/leo.jpg"},
                    {"id": 24045, "name": "Joseph Gordon-Levitt", "character": "Arthur", "profile_path": null}
                ]
            },
            "similar": {"page": 1, "results": [], "total_pages": 0, "total_results": 0}
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.movie.id, 27205);
        assert_eq!(details.movie.poster_path.as_deref(), Some("/inception.jpg"));
        assert_eq!(details.genres[0].name, "Action");
        assert_eq!(details.runtime, Some(148));
        assert_eq!(details.top_cast(1).len(), 1);
        assert_eq!(details.top_cast(10).len(), 2);
        assert_eq!(details.top_cast(10)[0].character, "Cobb");
        assert!(details.similar.is_some());
    }

    #[test]
    fn test_movie_details_without_credits_has_no_cast() {
        let json = r#"{"id": 1, "title": "Untitled", "genres": [], "runtime": null}"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert!(details.top_cast(10).is_empty());
        assert_eq!(details.runtime, None);
        assert_eq!(details.tagline, None);
    }

    #[test]
    fn test_movie_page_has_more() {
        let mut page = MoviePage::empty();
        assert!(!page.has_more());

        page.total_pages = 3;
        assert!(page.has_more());

        page.page = 3;
        assert!(!page.has_more());
    }
}
