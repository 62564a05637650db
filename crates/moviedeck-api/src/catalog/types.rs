//! Catalog API response types and request descriptors.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::ResourceDescriptor;

/// Language requested for listings.
pub const DEFAULT_LANGUAGE: &str = "en-US";

const TRAILER_TYPE: &str = "Trailer";
const YOUTUBE_SITE: &str = "YouTube";
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Listing category served by `movie/{category}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieCategory {
    /// Currently in theaters.
    NowPlaying,
    /// Most popular.
    Popular,
    /// Highest rated.
    TopRated,
    /// Upcoming releases.
    Upcoming,
}

impl MovieCategory {
    /// All categories in navigation order.
    pub const ALL: [Self; 4] = [Self::NowPlaying, Self::Popular, Self::TopRated, Self::Upcoming];

    /// Endpoint path segment.
    #[must_use]
    pub const fn as_path(self) -> &'static str {
        match self {
            Self::NowPlaying => "now_playing",
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
            Self::Upcoming => "upcoming",
        }
    }

    /// Heading shown above the listing.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::NowPlaying => "Now Playing",
            Self::Popular => "Popular",
            Self::TopRated => "Top Rated",
            Self::Upcoming => "Upcoming",
        }
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown movie category `{0}` (expected now_playing, popular, top_rated or upcoming)")]
pub struct UnknownCategory(pub String);

impl FromStr for MovieCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_path() == normalized)
            .ok_or_else(|| UnknownCategory(String::from(s)))
    }
}

/// Builders for the catalog's resource descriptors.
///
/// The API key is not part of a descriptor; the client adds it when sending.
#[derive(Debug, Clone, Copy)]
pub struct CatalogRequest;

impl CatalogRequest {
    /// `movie/{category}?language=en-US&page={page}`.
    #[must_use]
    pub fn listing(category: MovieCategory, page: u32) -> ResourceDescriptor {
        ResourceDescriptor::new(format!("movie/{}", category.as_path()))
            .param("language", DEFAULT_LANGUAGE)
            .param("page", page.max(1).to_string())
    }

    /// `movie/{id}`.
    #[must_use]
    pub fn details(movie_id: u64) -> ResourceDescriptor {
        ResourceDescriptor::new(format!("movie/{movie_id}"))
    }

    /// `movie/{id}/credits`.
    #[must_use]
    pub fn credits(movie_id: u64) -> ResourceDescriptor {
        ResourceDescriptor::new(format!("movie/{movie_id}/credits"))
    }

    /// `movie/{id}/recommendations`.
    #[must_use]
    pub fn recommendations(movie_id: u64) -> ResourceDescriptor {
        ResourceDescriptor::new(format!("movie/{movie_id}/recommendations"))
    }

    /// `movie/{id}/videos`.
    #[must_use]
    pub fn videos(movie_id: u64) -> ResourceDescriptor {
        ResourceDescriptor::new(format!("movie/{movie_id}/videos"))
    }

    /// `search/movie?query={query}`. A blank query yields an invalid descriptor.
    #[must_use]
    pub fn search(query: &str) -> ResourceDescriptor {
        ResourceDescriptor::new("search/movie").param("query", query.trim())
    }
}

// --- Listings ---

/// Paginated movie list (`movie/{category}`, `search/movie`, recommendations).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoviePage {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Movies on this page.
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A movie as it appears in lists.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    /// Catalog movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Release date (YYYY-MM-DD, may be empty).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

// --- Details ---

/// Response from `movie/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    /// Catalog movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Tagline.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Release date (YYYY-MM-DD, may be empty).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl MovieDetails {
    /// Year of the release date, if it parses.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

impl MovieSummary {
    /// Year of the release date, if it parses.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

fn release_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.year())
}

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

// --- Credits ---

/// Response from `movie/{id}/credits` (crew is ignored).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Credits {
    /// Movie ID.
    #[serde(default)]
    pub id: u64,
    /// Cast in billing order.
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// A single cast member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CastMember {
    /// Person ID.
    pub id: u64,
    /// Performer name.
    pub name: String,
    /// Character played.
    #[serde(default)]
    pub character: Option<String>,
    /// Profile image path.
    #[serde(default)]
    pub profile_path: Option<String>,
    /// Billing order.
    #[serde(default)]
    pub order: u32,
}

// --- Videos ---

/// Response from `movie/{id}/videos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoList {
    /// Movie ID.
    #[serde(default)]
    pub id: u64,
    /// Videos.
    #[serde(default)]
    pub results: Vec<Video>,
}

/// A single video entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    /// Platform-specific video key.
    pub key: String,
    /// Video title.
    #[serde(default)]
    pub name: String,
    /// Hosting platform (e.g. "YouTube").
    pub site: String,
    /// Video kind (e.g. "Trailer", "Teaser").
    #[serde(rename = "type")]
    pub video_type: String,
    /// Whether the studio published it.
    #[serde(default)]
    pub official: bool,
}

impl Video {
    /// Returns `true` for a trailer hosted on YouTube.
    #[must_use]
    pub fn is_youtube_trailer(&self) -> bool {
        self.video_type == TRAILER_TYPE && self.site == YOUTUBE_SITE
    }

    /// Watch URL for YouTube-hosted videos.
    #[must_use]
    pub fn watch_url(&self) -> Option<String> {
        (self.site == YOUTUBE_SITE).then(|| format!("{YOUTUBE_WATCH_URL}{}", self.key))
    }
}

// --- Error Response ---

/// Catalog API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogErrorResponse {
    /// Catalog error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_category_paths_and_titles() {
        // Arrange & Act & Assert
        assert_eq!(MovieCategory::NowPlaying.as_path(), "now_playing");
        assert_eq!(MovieCategory::TopRated.title(), "Top Rated");
        assert_eq!(MovieCategory::Upcoming.to_string(), "upcoming");
    }

    #[test]
    fn test_category_from_str_accepts_dashes_and_case() {
        // Arrange & Act & Assert
        assert_eq!("now-playing".parse::<MovieCategory>(), Ok(MovieCategory::NowPlaying));
        assert_eq!("TOP_RATED".parse::<MovieCategory>(), Ok(MovieCategory::TopRated));
        assert_eq!(
            "trending".parse::<MovieCategory>(),
            Err(UnknownCategory(String::from("trending")))
        );
    }

    #[test]
    fn test_listing_descriptor() {
        // Arrange & Act
        let descriptor = CatalogRequest::listing(MovieCategory::Popular, 0);

        // Assert
        assert_eq!(
            descriptor.to_string(),
            "movie/popular?language=en-US&page=1"
        );
    }

    #[test]
    fn test_search_descriptor_trims_query() {
        // Arrange & Act
        let descriptor = CatalogRequest::search("  heat ");

        // Assert
        assert_eq!(descriptor.to_string(), "search/movie?query=heat");
        assert!(CatalogRequest::search("   ").validate().is_err());
    }

    #[test]
    fn test_release_year() {
        // Arrange
        let json = r#"{"id":1,"title":"A","release_date":"1999-10-15"}"#;
        let empty = r#"{"id":2,"title":"B","release_date":""}"#;

        // Act
        let dated: MovieSummary = serde_json::from_str(json).unwrap();
        let undated: MovieSummary = serde_json::from_str(empty).unwrap();

        // Assert
        assert_eq!(dated.release_year(), Some(1999));
        assert_eq!(undated.release_year(), None);
    }

    #[test]
    fn test_video_watch_url_only_for_youtube() {
        // Arrange
        let json = include_str!("../../../../fixtures/catalog/videos_550.json");

        // Act
        let videos: VideoList = serde_json::from_str(json).unwrap();
        let urls: Vec<Option<String>> = videos.results.iter().map(Video::watch_url).collect();

        // Assert
        assert_eq!(
            urls,
            vec![
                Some(String::from("https://www.youtube.com/watch?v=dfeUzm6KF4g")),
                None,
                Some(String::from("https://www.youtube.com/watch?v=SUXWAEX2jlg")),
                Some(String::from("https://www.youtube.com/watch?v=BdJKm16Co6M")),
            ]
        );
    }

    #[test]
    fn test_parse_credits_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/catalog/credits_550.json");

        // Act
        let credits: Credits = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(credits.id, 550);
        assert_eq!(credits.cast.len(), 15);
        assert_eq!(credits.cast[0].name, "Edward Norton");
        assert_eq!(credits.cast[3].profile_path, None);
    }

    #[test]
    fn test_parse_details_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/catalog/movie_details_550.json");

        // Act
        let details: MovieDetails = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(details.title, "Fight Club");
        assert_eq!(details.runtime, Some(139));
        assert_eq!(details.genres.len(), 2);
        assert_eq!(details.release_year(), Some(1999));
    }

    #[test]
    fn test_parse_error_response() {
        // Arrange
        let json = r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#;

        // Act
        let error: CatalogErrorResponse = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(error.status_code, 7);
        assert!(error.status_message.contains("Invalid API key"));
    }
}
