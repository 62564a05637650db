//! `WatchlistClient` - watchlist backend client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::instrument;
use url::Url;

use super::api::LocalWatchlistApi;
use super::error::{WatchlistError, WatchlistResult};
use super::types::{
    BackendErrorResponse, Credentials, LoginResponse, RemoveOutcome, WatchlistEntry,
};
use crate::session::{Session, SessionStore};

/// Default base URL of the watchlist backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the session token.
const AUTH_HEADER: &str = "x-auth-token";

/// Watchlist backend client.
///
/// Every watchlist call reads the token from the [`SessionStore`] and clears
/// the store when the backend rejects it.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct WatchlistClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Shared session.
    session: SessionStore,
}

/// Builder for `WatchlistClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct WatchlistClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    session: Option<SessionStore>,
}

impl WatchlistClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout: None,
            session: None,
        }
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the request timeout (default: 10s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the session store (required).
    #[must_use]
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `session` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<WatchlistClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;
        let session = self.session.context("session is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context("failed to build HTTP client")?;

        Ok(WatchlistClient {
            http_client,
            base_url,
            session,
        })
    }
}

impl WatchlistClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> WatchlistClientBuilder {
        WatchlistClientBuilder::new()
    }

    /// Returns the session store this client reads from.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Ends the session. No request is sent.
    pub fn logout(&self) {
        self.session.clear_session();
    }

    fn require_token(&self) -> WatchlistResult<String> {
        self.session.get_token().ok_or_else(|| {
            tracing::debug!("No session token; not contacting the watchlist backend");
            WatchlistError::Unauthenticated
        })
    }

    fn request(&self, method: Method, path: &str) -> WatchlistResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| WatchlistError::OtherFailure {
                status: None,
                message: format!("failed to join URL path {path}: {e}"),
            })?;
        tracing::debug!(%method, url = %url, "Watchlist API request");
        Ok(self.http_client.request(method, url))
    }

    /// Builds a request carrying the session token, or fails without one.
    fn authorized(&self, method: Method, path: &str) -> WatchlistResult<RequestBuilder> {
        let token = self.require_token()?;
        Ok(self.request(method, path)?.header(AUTH_HEADER, token))
    }

    /// Clears the session when `status` is an authentication rejection.
    fn check_rejected(&self, status: StatusCode) -> WatchlistResult<()> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                status = status.as_u16(),
                "Watchlist backend rejected the session token"
            );
            self.session.clear_session();
            return Err(WatchlistError::Unauthenticated);
        }
        Ok(())
    }
}

/// Builds `OtherFailure` from a non-2xx response, preferring the backend's `error` field.
async fn other_failure(response: Response) -> WatchlistError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<BackendErrorResponse>(&body).map_or_else(
        |_| {
            if body.trim().is_empty() {
                String::from(status.canonical_reason().unwrap_or("unexpected status"))
            } else {
                body
            }
        },
        |e| e.error,
    );
    tracing::warn!(status = status.as_u16(), %message, "Watchlist API error");
    WatchlistError::OtherFailure {
        status: Some(status.as_u16()),
        message,
    }
}

impl LocalWatchlistApi for WatchlistClient {
    #[instrument(skip_all)]
    async fn list(&self) -> WatchlistResult<Vec<WatchlistEntry>> {
        let response = self.authorized(Method::GET, "watchlist")?.send().await?;
        let status = response.status();
        self.check_rejected(status)?;
        if !status.is_success() {
            return Err(other_failure(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| WatchlistError::OtherFailure {
            status: Some(status.as_u16()),
            message: format!("failed to decode watchlist: {e}"),
        })
    }

    #[instrument(skip_all, fields(movie_id = entry.movie_id))]
    async fn add(&self, entry: &WatchlistEntry) -> WatchlistResult<()> {
        let response = self
            .authorized(Method::POST, "watchlist")?
            .json(entry)
            .send()
            .await?;
        let status = response.status();
        self.check_rejected(status)?;
        if status == StatusCode::CONFLICT {
            return Err(WatchlistError::AlreadyExists);
        }
        if !status.is_success() {
            return Err(other_failure(response).await);
        }

        tracing::info!(movie_id = entry.movie_id, title = %entry.title, "Added to watchlist");
        Ok(())
    }

    #[instrument(skip_all, fields(movie_id = movie_id))]
    async fn remove(&self, movie_id: u64) -> WatchlistResult<RemoveOutcome> {
        let path = format!("watchlist/{movie_id}");
        let response = self.authorized(Method::DELETE, &path)?.send().await?;
        let status = response.status();
        self.check_rejected(status)?;

        if status.is_success() {
            tracing::info!(movie_id, status = status.as_u16(), "Removed from watchlist");
            return Ok(RemoveOutcome::Removed {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NOT_FOUND {
            tracing::info!(movie_id, "Movie was not on the watchlist");
            return Ok(RemoveOutcome::NotPresent {
                status: status.as_u16(),
            });
        }
        Err(other_failure(response).await)
    }

    #[instrument(skip_all)]
    async fn login(&self, username: &str, password: &str) -> WatchlistResult<Session> {
        let response = self
            .request(Method::POST, "auth/login")?
            .json(&Credentials { username, password })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(other_failure(response).await);
        }

        let body = response.text().await?;
        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| WatchlistError::OtherFailure {
                status: Some(status.as_u16()),
                message: format!("failed to decode login response: {e}"),
            })?;
        if login.token.trim().is_empty() {
            return Err(WatchlistError::OtherFailure {
                status: Some(status.as_u16()),
                message: String::from("login response did not contain a token"),
            });
        }

        let display_name = login.username.unwrap_or_else(|| String::from(username));
        self.session.set_session(login.token, display_name);
        Ok(self.session.snapshot())
    }

    #[instrument(skip_all)]
    async fn register(&self, username: &str, password: &str) -> WatchlistResult<()> {
        let response = self
            .request(Method::POST, "auth/register")?
            .json(&Credentials { username, password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(other_failure(response).await);
        }

        tracing::info!(username, "Account created");
        Ok(())
    }
}
