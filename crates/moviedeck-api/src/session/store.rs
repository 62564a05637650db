//! `SessionStore` - shared authentication state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Snapshot of the current session.
///
/// Both fields are set together by [`SessionStore::set_session`] and
/// removed together by [`SessionStore::clear_session`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token issued by the watchlist backend.
    #[serde(default)]
    pub token: Option<String>,
    /// Display name of the logged-in user.
    #[serde(default)]
    pub username: Option<String>,
}

/// Login state as observed by navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// A token is present.
    LoggedIn {
        /// Display name, if the backend supplied one.
        username: Option<String>,
    },
    /// No token is present.
    LoggedOut,
}

impl Session {
    /// Returns the login state for this snapshot.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.token.is_some() {
            SessionStatus::LoggedIn {
                username: self.username.clone(),
            }
        } else {
            SessionStatus::LoggedOut
        }
    }
}

/// Process-wide session store.
///
/// Cloning the store yields another handle onto the same state.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// Current session; the channel doubles as the change feed.
    state: watch::Sender<Session>,
    /// Backing file, if the session is persisted.
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Creates a store that keeps the session in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_state(Session::default(), None)
    }

    /// Opens a store persisted at `path`.
    ///
    /// A missing file yields an empty session. An unreadable or corrupt file
    /// is logged and also yields an empty session.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match load_session(&path) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable session file");
                Session::default()
            }
        };
        Self::with_state(session, Some(path))
    }

    fn with_state(session: Session, path: Option<PathBuf>) -> Self {
        let (state, _) = watch::channel(session);
        Self {
            inner: Arc::new(Inner { state, path }),
        }
    }

    /// Returns the stored token.
    #[must_use]
    pub fn get_token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    /// Returns the stored display name.
    #[must_use]
    pub fn get_username(&self) -> Option<String> {
        self.inner.state.borrow().username.clone()
    }

    /// Returns both fields as one consistent snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Returns `true` while a token is stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.inner.state.borrow().token.is_some()
    }

    /// Returns a receiver that observes every session change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Stores token and display name in a single update.
    ///
    /// A blank token is ignored and leaves the current session untouched.
    pub fn set_session(&self, token: impl Into<String>, username: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            tracing::warn!("Ignoring blank session token");
            return;
        }

        let session = Session {
            token: Some(token),
            username: Some(username.into()),
        };
        self.inner.state.send_replace(session.clone());
        tracing::info!(username = session.username.as_deref().unwrap_or("-"), "session started");

        if let Some(path) = &self.inner.path
            && let Err(e) = save_session(path, &session)
        {
            tracing::warn!(path = %path.display(), error = %e, "Failed to persist session");
        }
    }

    /// Removes every session field.
    pub fn clear_session(&self) {
        self.inner.state.send_replace(Session::default());
        tracing::info!("session cleared");

        if let Some(path) = &self.inner.path
            && path.exists()
            && let Err(e) = std::fs::remove_file(path)
        {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove session file");
        }
    }
}

/// Reads a persisted session. Returns an empty session if the file does not exist.
fn load_session(path: &Path) -> Result<Session> {
    if !path.exists() {
        return Ok(Session::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let session: Session =
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;

    // A half-written file must not resurrect a token without its user.
    if session.token.is_some() != session.username.is_some() {
        return Ok(Session::default());
    }
    Ok(session)
}

/// Writes the session, creating parent directories if needed.
fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(session).context("failed to serialize session")?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
