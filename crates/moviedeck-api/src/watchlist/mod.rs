//! Watchlist backend client.
//!
//! Authenticated add/list/remove plus login and registration. Every call
//! reads the token from the shared [`SessionStore`](crate::session::SessionStore).

mod api;
mod cache;
mod client;
mod error;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalWatchlistApi, WatchlistApi};
pub use cache::{AuthCallState, CachedWatchlist};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, WatchlistClient, WatchlistClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use error::{WatchlistError, WatchlistResult};
pub use types::{RemoveOutcome, WatchlistEntry};
