//! `CachedWatchlist` - local copy of the watchlist plus the auth-call state.
#![allow(clippy::future_not_send)]

use super::api::LocalWatchlistApi;
use super::error::{WatchlistError, WatchlistResult};
use super::types::{RemoveOutcome, WatchlistEntry};

/// Progress of the most recent authenticated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthCallState {
    /// No call made yet.
    #[default]
    NotAttempted,
    /// A call is outstanding.
    InFlight,
    /// The last call succeeded.
    Succeeded,
    /// The last call was rejected; the session has been cleared.
    Unauthenticated,
    /// The last call failed for another reason.
    OtherFailure,
}

impl AuthCallState {
    fn after<T>(result: &WatchlistResult<T>) -> Self {
        match result {
            Ok(_) => Self::Succeeded,
            Err(WatchlistError::Unauthenticated) => Self::Unauthenticated,
            Err(WatchlistError::AlreadyExists | WatchlistError::OtherFailure { .. }) => {
                Self::OtherFailure
            }
        }
    }
}

/// Watchlist view model.
///
/// The entry list is replaced on every successful [`refresh`](Self::refresh)
/// and pruned once a removal resolves. Nothing is retried.
#[derive(Debug)]
pub struct CachedWatchlist<C> {
    client: C,
    entries: Vec<WatchlistEntry>,
    state: AuthCallState,
}

impl<C: LocalWatchlistApi> CachedWatchlist<C> {
    /// Creates an empty cache over `client`.
    pub const fn new(client: C) -> Self {
        Self {
            client,
            entries: Vec::new(),
            state: AuthCallState::NotAttempted,
        }
    }

    /// Cached entries in backend order.
    #[must_use]
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    /// State of the most recent call.
    #[must_use]
    pub const fn state(&self) -> AuthCallState {
        self.state
    }

    /// Returns `true` if `movie_id` is cached.
    #[must_use]
    pub fn contains(&self, movie_id: u64) -> bool {
        self.entries.iter().any(|e| e.movie_id == movie_id)
    }

    /// The wrapped client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Reloads the list from the backend.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`WatchlistError`]. On `Unauthenticated` the
    /// cached entries are dropped.
    pub async fn refresh(&mut self) -> WatchlistResult<&[WatchlistEntry]> {
        self.state = AuthCallState::InFlight;
        let result = self.client.list().await;
        self.settle(&result);
        self.entries = result?;
        tracing::debug!(count = self.entries.len(), "Watchlist refreshed");
        Ok(&self.entries)
    }

    /// Saves `entry` on the backend. The cache is left as is until the next refresh.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`WatchlistError`].
    pub async fn add(&mut self, entry: &WatchlistEntry) -> WatchlistResult<()> {
        self.state = AuthCallState::InFlight;
        let result = self.client.add(entry).await;
        self.settle(&result);
        result
    }

    /// Removes `movie_id` on the backend, then prunes it from the cache.
    ///
    /// The cache is pruned for both `Removed` and `NotPresent`, never before
    /// the backend has answered.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`WatchlistError`]; the entry stays cached.
    pub async fn remove(&mut self, movie_id: u64) -> WatchlistResult<RemoveOutcome> {
        self.state = AuthCallState::InFlight;
        let result = self.client.remove(movie_id).await;
        self.settle(&result);
        let outcome = result?;
        self.entries.retain(|e| e.movie_id != movie_id);
        Ok(outcome)
    }

    fn settle<T>(&mut self, result: &WatchlistResult<T>) {
        self.state = AuthCallState::after(result);
        if self.state == AuthCallState::Unauthenticated {
            self.entries.clear();
        }
    }
}
