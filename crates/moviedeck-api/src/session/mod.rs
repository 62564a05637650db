//! Session store module.
//!
//! Holds the watchlist backend token and the display name of the
//! logged-in user, optionally persisted to a TOML file.

mod store;

#[allow(clippy::module_name_repetitions)]
pub use store::{Session, SessionStatus, SessionStore};
