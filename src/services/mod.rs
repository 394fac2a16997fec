pub mod catalog;
pub mod favorites;
pub mod providers;
pub mod search;

pub use favorites::FavoritesStore;
pub use providers::{MovieProvider, TmdbProvider};
pub use search::{SearchSession, SearchState, SearchStatus};
