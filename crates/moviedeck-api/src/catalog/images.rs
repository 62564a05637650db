//! Image CDN URLs and list-rendering helpers.

/// Base URL of the catalog image CDN.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Shown when a movie has no poster.
pub const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/500x750?text=No+Image";

/// Shown when a cast member has no profile picture.
pub const PROFILE_PLACEHOLDER: &str = "https://via.placeholder.com/200x200?text=N/A";

/// Overview length (in characters) used by list views.
pub const OVERVIEW_EXCERPT_CHARS: usize = 100;

/// Rendition width requested from the CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// Cast profiles.
    W200,
    /// Posters.
    W500,
    /// Backdrops.
    Original,
}

impl ImageSize {
    /// Path segment for this size.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W200 => "w200",
            Self::W500 => "w500",
            Self::Original => "original",
        }
    }
}

/// Builds a CDN URL, or `None` when `path` is absent or blank.
#[must_use]
pub fn image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let separator = if path.starts_with('/') { "" } else { "/" };
    Some(format!("{IMAGE_BASE_URL}/{}{separator}{path}", size.as_str()))
}

/// Poster URL (`w500`), falling back to [`POSTER_PLACEHOLDER`].
#[must_use]
pub fn poster_url(path: Option<&str>) -> String {
    image_url(path, ImageSize::W500).unwrap_or_else(|| String::from(POSTER_PLACEHOLDER))
}

/// Profile URL (`w200`), falling back to [`PROFILE_PLACEHOLDER`].
#[must_use]
pub fn profile_url(path: Option<&str>) -> String {
    image_url(path, ImageSize::W200).unwrap_or_else(|| String::from(PROFILE_PLACEHOLDER))
}

/// Backdrop URL (`original`). Detail views omit the backdrop when absent.
#[must_use]
pub fn backdrop_url(path: Option<&str>) -> Option<String> {
    image_url(path, ImageSize::Original)
}

/// Cuts `text` to `max_chars` characters and appends `...` when it was longer.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", text.get(..end).unwrap_or(text)),
        None => String::from(text),
    }
}
