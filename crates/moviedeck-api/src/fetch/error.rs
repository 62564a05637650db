//! Fetch failure taxonomy shared by the fetcher and the catalog client.

use thiserror::Error;

/// Result alias for catalog reads.
#[allow(clippy::module_name_repetitions)]
pub type FetchResult<T> = Result<T, FetchError>;

/// Classified failure of a catalog read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum FetchError {
    /// The catalog API key is not configured.
    #[error("catalog API key is not configured")]
    MissingConfiguration,
    /// The descriptor is absent or malformed; no request was sent.
    #[error("invalid resource descriptor: {0}")]
    InvalidDescriptor(String),
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),
    /// The catalog answered with a non-2xx status.
    #[error("catalog request failed with HTTP {status}{}", message_suffix(.message))]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// `status_message` from the catalog error body, if any.
        message: Option<String>,
    },
    /// The response body could not be decoded.
    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

/// Formats the optional catalog message as a `": ..."` suffix.
fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl FetchError {
    /// Returns the HTTP status code for [`FetchError::HttpStatus`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string.
        let e = e.without_url();
        if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_with_message() {
        // Arrange
        let err = FetchError::HttpStatus {
            status: 401,
            message: Some(String::from("Invalid API key")),
        };

        // Act & Assert
        assert_eq!(
            err.to_string(),
            "catalog request failed with HTTP 401: Invalid API key"
        );
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_http_status_display_without_message() {
        // Arrange
        let err = FetchError::HttpStatus {
            status: 503,
            message: None,
        };

        // Act & Assert
        assert_eq!(err.to_string(), "catalog request failed with HTTP 503");
    }

    #[test]
    fn test_non_http_errors_have_no_status() {
        // Arrange & Act & Assert
        assert_eq!(FetchError::MissingConfiguration.status(), None);
        assert_eq!(FetchError::Network(String::from("reset")).status(), None);
    }
}
