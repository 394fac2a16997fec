use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Image shown when a movie has no poster or profile picture
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iNTAwIiBoZWlnaHQ9Ijc1MCIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj48cmVjdCB3aWR0aD0iNTAwIiBoZWlnaHQ9Ijc1MCIgZmlsbD0iIzMzMzMzMyIvPjx0ZXh0IHg9IjUwJSIgeT0iNTAlIiBmb250LWZhbWlseT0iQXJpYWwiIGZvbnQtc2l6ZT0iMjQiIGZpbGw9IiM5OTk5OTkiIHRleHQtYW5jaG9yPSJtaWRkbGUiIGR5PSIuM2VtIj5ObyBJbWFnZTwvdGV4dD48L3N2Zz4=";

/// Size tags accepted by the image CDN
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    W200,
    W300,
    #[default]
    W500,
    W780,
    Original,
}

impl Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            ImageSize::W200 => "w200",
            ImageSize::W300 => "w300",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::Original => "original",
        };
        write!(f, "{}", tag)
    }
}

/// Builds an image URL from a relative path, or the placeholder when there is no path
pub fn image_url(base: &str, path: Option<&str>, size: ImageSize) -> String {
    match path {
        Some(path) if !path.is_empty() => format!("{}/{}{}", base, size, path),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}
