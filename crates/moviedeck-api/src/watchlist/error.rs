//! Watchlist failure taxonomy.

use thiserror::Error;

/// Result alias for watchlist calls.
#[allow(clippy::module_name_repetitions)]
pub type WatchlistResult<T> = Result<T, WatchlistError>;

/// Classified failure of an authenticated watchlist call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum WatchlistError {
    /// No session token, or the backend rejected it. The session has been cleared.
    #[error("not logged in (run `moviedeck auth login` first)")]
    Unauthenticated,
    /// The movie is already on the watchlist.
    #[error("movie is already in the watchlist")]
    AlreadyExists,
    /// Any other failure, with the backend's status when one was received.
    #[error("watchlist request failed{}: {message}", status_suffix(.status))]
    OtherFailure {
        /// HTTP status code, absent for transport failures.
        status: Option<u16>,
        /// Backend `error` message or transport error text.
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with HTTP {s}")).unwrap_or_default()
}

impl WatchlistError {
    /// Returns the HTTP status of an [`WatchlistError::OtherFailure`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::OtherFailure { status, .. } => *status,
            Self::Unauthenticated | Self::AlreadyExists => None,
        }
    }
}

impl From<reqwest::Error> for WatchlistError {
    fn from(e: reqwest::Error) -> Self {
        Self::OtherFailure {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_failure_display() {
        // Arrange
        let with_status = WatchlistError::OtherFailure {
            status: Some(500),
            message: String::from("Server error"),
        };
        let without_status = WatchlistError::OtherFailure {
            status: None,
            message: String::from("connection refused"),
        };

        // Act & Assert
        assert_eq!(
            with_status.to_string(),
            "watchlist request failed with HTTP 500: Server error"
        );
        assert_eq!(
            without_status.to_string(),
            "watchlist request failed: connection refused"
        );
        assert_eq!(with_status.status(), Some(500));
        assert_eq!(without_status.status(), None);
    }

    #[test]
    fn test_unauthenticated_mentions_login() {
        // Arrange & Act
        let message = WatchlistError::Unauthenticated.to_string();

        // Assert
        assert!(message.starts_with("not logged in"));
    }
}
