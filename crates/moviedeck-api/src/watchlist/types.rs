//! Watchlist backend request and response types.

use serde::{Deserialize, Serialize};

use crate::catalog::MovieDetails;

/// A movie saved on the user's watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    /// Catalog movie ID.
    #[serde(rename = "movieId")]
    pub movie_id: u64,
    /// Title at the time it was saved.
    pub title: String,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Vote average at the time it was saved.
    #[serde(default)]
    pub vote_average: f64,
}

impl From<&MovieDetails> for WatchlistEntry {
    fn from(details: &MovieDetails) -> Self {
        Self {
            movie_id: details.id,
            title: details.title.clone(),
            poster_path: details.poster_path.clone(),
            vote_average: details.vote_average,
        }
    }
}

/// Backend answer to a removal that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The entry was deleted.
    Removed {
        /// 2xx status returned by the backend.
        status: u16,
    },
    /// The entry was not on the watchlist (HTTP 404).
    NotPresent {
        /// Status returned by the backend.
        status: u16,
    },
}

impl RemoveOutcome {
    /// Status code the backend actually returned.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::Removed { status } | Self::NotPresent { status } => status,
        }
    }
}

/// Body of `auth/login` and `auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful `auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Error body returned by the backend (`{"error": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub struct BackendErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_entry_wire_names() {
        // Arrange
        let entry = WatchlistEntry {
            movie_id: 550,
            title: String::from("Fight Club"),
            poster_path: Some(String::from("/p.jpg")),
            vote_average: 8.4,
        };

        // Act
        let value = serde_json::to_value(&entry).unwrap();

        // Assert
        assert_eq!(
            value,
            json!({
                "movieId": 550,
                "title": "Fight Club",
                "poster_path": "/p.jpg",
                "vote_average": 8.4
            })
        );
    }

    #[test]
    fn test_entry_from_backend_without_optional_fields() {
        // Arrange
        let json = r#"{"_id":"65f0","movieId":680,"title":"Pulp Fiction","userId":"u1"}"#;

        // Act
        let entry: WatchlistEntry = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(entry.movie_id, 680);
        assert_eq!(entry.poster_path, None);
        assert!(entry.vote_average.abs() < f64::EPSILON);
    }

    #[test]
    fn test_entry_from_details() {
        // Arrange
        let json = include_str!("../../../../fixtures/catalog/movie_details_550.json");
        let details: MovieDetails = serde_json::from_str(json).unwrap();

        // Act
        let entry = WatchlistEntry::from(&details);

        // Assert
        assert_eq!(entry.movie_id, 550);
        assert_eq!(entry.title, "Fight Club");
        assert_eq!(
            entry.poster_path.as_deref(),
            Some("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg")
        );
    }

    #[test]
    fn test_remove_outcome_status() {
        // Arrange & Act & Assert
        assert_eq!(RemoveOutcome::Removed { status: 200 }.status(), 200);
        assert_eq!(RemoveOutcome::NotPresent { status: 404 }.status(), 404);
    }
}
