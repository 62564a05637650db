//! Data layer for moviedeck.
//!
//! Provides the session store, the cancellable resource fetcher, and clients
//! for the movie catalog API and the personal watchlist backend.

/// Movie catalog (TMDB v3) client.
pub mod catalog;

/// Subscribe-to-a-resource fetcher with cancellation.
pub mod fetch;

/// Authentication session store.
pub mod session;

/// Personal watchlist backend client.
pub mod watchlist;
