pub mod favorite;
pub mod image;
pub mod movie;

pub use favorite::{FavoriteMovie, FavoritesEvent};
pub use image::{image_url, ImageSize, PLACEHOLDER_IMAGE};
pub use movie::{CastMember, Credits, Genre, Movie, MovieDetails, MovieList, MoviePage};
