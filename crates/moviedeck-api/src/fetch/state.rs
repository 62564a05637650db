//! `FetchState` - per-subscription lifecycle of a remote read.

use super::error::FetchError;

/// Published state of a subscription.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub enum FetchState<T> {
    /// Nothing subscribed.
    Idle,
    /// A request for the current descriptor is outstanding.
    Loading,
    /// The current descriptor resolved successfully.
    Success(T),
    /// The current descriptor failed.
    Failure(FetchError),
}

impl<T> FetchState<T> {
    /// Returns `true` for `Success` and `Failure`.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }

    /// Returns `true` while loading.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the payload of a successful fetch.
    #[must_use]
    pub const fn payload(&self) -> Option<&T> {
        match self {
            Self::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// Returns the failure reason.
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failure(e) => Some(e),
            _ => None,
        }
    }

    /// Converts a settled state into a `Result`; `Idle` and `Loading` yield `None`.
    #[must_use]
    pub fn into_result(self) -> Option<Result<T, FetchError>> {
        match self {
            Self::Success(payload) => Some(Ok(payload)),
            Self::Failure(e) => Some(Err(e)),
            Self::Idle | Self::Loading => None,
        }
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> From<Result<T, FetchError>> for FetchState<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(e) => Self::Failure(e),
        }
    }
}
