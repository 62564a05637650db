//! `WatchlistApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::WatchlistResult;
use super::types::{RemoveOutcome, WatchlistEntry};
use crate::session::Session;

/// Watchlist backend trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(WatchlistApi: Send)]
pub trait LocalWatchlistApi {
    /// Fetches the user's watchlist.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::Unauthenticated`](super::WatchlistError::Unauthenticated)
    /// without a request when no token is stored, or when the backend
    /// rejects the token.
    async fn list(&self) -> WatchlistResult<Vec<WatchlistEntry>>;

    /// Saves a movie to the watchlist.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::AlreadyExists`](super::WatchlistError::AlreadyExists)
    /// on HTTP 409, otherwise as [`list`](Self::list).
    async fn add(&self, entry: &WatchlistEntry) -> WatchlistResult<()>;

    /// Deletes a movie from the watchlist and reports the backend's status.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list); statuses other than 2xx, 401, 403 and
    /// 404 are returned as `OtherFailure`.
    async fn remove(&self, movie_id: u64) -> WatchlistResult<RemoveOutcome>;

    /// Logs in and stores the returned session.
    ///
    /// # Errors
    ///
    /// Returns `OtherFailure` carrying the backend's `error` message.
    async fn login(&self, username: &str, password: &str) -> WatchlistResult<Session>;

    /// Creates an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `OtherFailure` carrying the backend's `error` message.
    async fn register(&self, username: &str, password: &str) -> WatchlistResult<()>;
}
