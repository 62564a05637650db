//! `CatalogClient` - catalog API client implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::api::LocalCatalogApi;
use super::normalize::{self, TrailerLookup};
use super::types::{
    CastMember, CatalogErrorResponse, CatalogRequest, Credits, MovieCategory, MovieDetails,
    MoviePage, MovieSummary, VideoList,
};
use crate::fetch::{FetchError, FetchResult, ResourceDescriptor, ResourceTransport};

/// Default base URL for the catalog API v3.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog API client.
///
/// Also the production [`ResourceTransport`] behind
/// [`ResourceFetcher`](crate::fetch::ResourceFetcher).
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CatalogClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key sent as the `api_key` query parameter.
    api_key: Option<String>,
}

/// Builder for `CatalogClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CatalogClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl CatalogClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key. A blank key counts as not configured.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then_some(key);
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

    /// Builds the client.
    ///
    /// A missing API key is not a build error; requests fail with
    /// [`FetchError::MissingConfiguration`] instead.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<CatalogClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

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

        Ok(CatalogClient {
            http_client,
            base_url,
            api_key: self.api_key,
        })
    }
}

impl CatalogClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::new()
    }

    /// Returns `true` when an API key is set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn require_api_key(&self) -> FetchResult<&str> {
        self.api_key
            .as_deref()
            .ok_or(FetchError::MissingConfiguration)
    }

    /// Sends a GET for `descriptor` with the API key appended.
    #[instrument(skip_all, fields(endpoint = descriptor.endpoint()))]
    async fn get_json(&self, descriptor: &ResourceDescriptor) -> FetchResult<Value> {
        descriptor
            .validate()
            .map_err(FetchError::InvalidDescriptor)?;
        let api_key = self.require_api_key()?;

        let url = self
            .base_url
            .join(descriptor.endpoint())
            .map_err(|e| FetchError::InvalidDescriptor(format!("{descriptor}: {e}")))?;

        let request = self
            .http_client
            .get(url)
            .query(&descriptor.query_pairs())
            .query(&[("api_key", api_key)])
            .build()?;

        // The URL carries the key; log the descriptor instead.
        tracing::debug!(descriptor = %descriptor, "Catalog API request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            let message = serde_json::from_str::<CatalogErrorResponse>(&body)
                .ok()
                .map(|e| e.status_message);
            tracing::warn!(
                descriptor = %descriptor,
                status = status.as_u16(),
                message = message.as_deref().unwrap_or_default(),
                "Catalog API error"
            );
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Like [`get_json`](Self::get_json), decoding into `T`.
    async fn get<T: DeserializeOwned>(&self, descriptor: &ResourceDescriptor) -> FetchResult<T> {
        let body = self.get_json(descriptor).await?;
        serde_json::from_value(body).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

impl ResourceTransport for CatalogClient {
    fn ensure_configured(&self) -> Result<(), FetchError> {
        self.require_api_key().map(|_| ())
    }

    async fn fetch(&self, descriptor: &ResourceDescriptor) -> Result<Value, FetchError> {
        self.get_json(descriptor).await
    }
}

impl LocalCatalogApi for CatalogClient {
    #[instrument(skip_all)]
    async fn list_movies(&self, category: MovieCategory, page: u32) -> FetchResult<MoviePage> {
        self.get(&CatalogRequest::listing(category, page)).await
    }

    #[instrument(skip_all)]
    async fn movie_details(&self, movie_id: u64) -> FetchResult<MovieDetails> {
        self.get(&CatalogRequest::details(movie_id)).await
    }

    #[instrument(skip_all)]
    async fn top_cast(&self, movie_id: u64) -> FetchResult<Vec<CastMember>> {
        let credits: Credits = self.get(&CatalogRequest::credits(movie_id)).await?;
        Ok(normalize::top_cast(credits))
    }

    #[instrument(skip_all)]
    async fn recommendations(&self, movie_id: u64) -> FetchResult<Vec<MovieSummary>> {
        let page: MoviePage = self
            .get(&CatalogRequest::recommendations(movie_id))
            .await?;
        Ok(normalize::top_recommendations(page))
    }

    #[instrument(skip_all)]
    async fn search(&self, query: &str) -> FetchResult<MoviePage> {
        self.get(&CatalogRequest::search(query)).await
    }

    #[instrument(skip_all)]
    async fn trailer(&self, movie_id: u64) -> FetchResult<TrailerLookup> {
        let videos: VideoList = self.get(&CatalogRequest::videos(movie_id)).await?;
        let lookup = normalize::select_trailer(videos);
        if lookup == TrailerLookup::NoTrailer {
            tracing::debug!(movie_id, "No YouTube trailer");
        }
        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Arc;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::fetch::{FetchState, ResourceFetcher};

    fn client_for(server: &MockServer) -> CatalogClient {
        let base_url = format!("{}/3/", server.uri());
        CatalogClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_user_agent() {
        // Arrange & Act
        let result = CatalogClient::builder().api_key("test-key").build();

        // Assert
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("user_agent is required")
        );
    }

    #[test]
    fn test_builder_without_api_key_is_unconfigured() {
        // Arrange & Act
        let client = CatalogClient::builder()
            .api_key("  ")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Assert
        assert!(!client.is_configured());
        assert_eq!(
            client.ensure_configured(),
            Err(FetchError::MissingConfiguration)
        );
    }

    #[test]
    fn test_builder_with_custom_base_url() {
        // Arrange
        let custom_url = Url::parse("http://localhost:8080/3/").unwrap();

        // Act
        let client = CatalogClient::builder()
            .base_url(custom_url.clone())
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.base_url, custom_url);
        assert_eq!(client.base_url.as_str(), "http://localhost:8080/3/");
    }

    #[tokio::test]
    async fn test_list_movies_sends_api_key_language_and_page() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/catalog/now_playing.json");

        Mock::given(method("GET"))
            .and(path("/3/movie/now_playing"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("language", "en-US"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let page = client
            .list_movies(MovieCategory::NowPlaying, 2)
            .await
            .unwrap();

        // Assert
        assert_eq!(page.results.len(), 4);
        assert_eq!(page.results[0].title, "Fight Club");
        assert_eq!(page.total_pages, 12);
    }

    #[tokio::test]
    async fn test_top_cast_truncates_to_ten() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/catalog/credits_550.json");

        Mock::given(method("GET"))
            .and(path("/3/movie/550/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let cast = client.top_cast(550).await.unwrap();

        // Assert
        assert_eq!(cast.len(), 10);
        assert_eq!(cast[0].name, "Edward Norton");
        assert_eq!(cast[9].name, "David Andrews");
    }

    #[tokio::test]
    async fn test_recommendations_truncates_to_four() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/catalog/recommendations_550.json");

        Mock::given(method("GET"))
            .and(path("/3/movie/550/recommendations"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let recommendations = client.recommendations(550).await.unwrap();

        // Assert
        let titles: Vec<&str> = recommendations.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Recommended 1", "Recommended 2", "Recommended 3", "Recommended 4"]
        );
    }

    #[tokio::test]
    async fn test_trailer_selects_first_youtube_trailer() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/catalog/videos_550.json");

        Mock::given(method("GET"))
            .and(path("/3/movie/550/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let lookup = client.trailer(550).await.unwrap();

        // Assert
        let video = lookup.video().unwrap();
        assert_eq!(video.key, "SUXWAEX2jlg");
        assert_eq!(
            video.watch_url().as_deref(),
            Some("https://www.youtube.com/watch?v=SUXWAEX2jlg")
        );
    }

    #[tokio::test]
    async fn test_trailer_reports_no_trailer() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/catalog/videos_no_trailer.json");

        Mock::given(method("GET"))
            .and(path("/3/movie/949/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let lookup = client.trailer(949).await.unwrap();

        // Assert
        assert_eq!(lookup, TrailerLookup::NoTrailer);
    }

    #[tokio::test]
    async fn test_search_sends_query() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/catalog/search_heat.json");

        Mock::given(method("GET"))
            .and(path("/3/search/movie"))
            .and(query_param("query", "heat"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let page = client.search(" heat ").await.unwrap();

        // Assert
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 949);
    }

    #[tokio::test]
    async fn test_search_empty_results() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/catalog/search_empty.json");

        Mock::given(method("GET"))
            .and(path("/3/search/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let page = client.search("zzzzzz").await.unwrap();

        // Assert
        assert!(page.results.is_empty());
        assert_eq!(page.total_results, 0);
    }

    #[tokio::test]
    async fn test_blank_search_makes_no_request() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.search("   ").await;

        // Assert
        assert!(matches!(result, Err(FetchError::InvalidDescriptor(_))));
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let base_url = format!("{}/3/", mock_server.uri());
        let client = CatalogClient::builder()
            .base_url(base_url.parse().unwrap())
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Act
        let result = client.movie_details(550).await;

        // Assert
        assert_eq!(result, Err(FetchError::MissingConfiguration));
    }

    #[tokio::test]
    async fn test_http_error_carries_status_message() {
        // Arrange
        let mock_server = MockServer::start().await;
        let error_body = r#"{"status_code":34,"status_message":"The resource you requested could not be found.","success":false}"#;

        Mock::given(method("GET"))
            .and(path("/3/movie/999999999"))
            .respond_with(ResponseTemplate::new(404).set_body_string(error_body))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.movie_details(999_999_999).await;

        // Assert
        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err,
            FetchError::HttpStatus {
                status: 404,
                message: Some(String::from(
                    "The resource you requested could not be found."
                )),
            }
        );
    }

    #[tokio::test]
    async fn test_http_error_without_json_body() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.movie_details(550).await;

        // Assert
        assert_eq!(
            result,
            Err(FetchError::HttpStatus {
                status: 503,
                message: None
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);

        // Act
        let result = client.movie_details(550).await;

        // Assert
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let base_url = format!("{}/3/", mock_server.uri());
        let client = CatalogClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();

        // Act
        let result = client.movie_details(550).await;

        // Assert
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_network_error_does_not_expose_api_key() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let base_url = format!("{}/3/", mock_server.uri());
        let client = CatalogClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("SECRET-KEY-123")
            .user_agent("test/0.0.0")
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();

        // Act
        let err = client.movie_details(550).await.unwrap_err();

        // Assert
        assert!(matches!(err, FetchError::Network(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!err.to_string().contains("api_key"));
    }

    #[tokio::test]
    async fn test_blank_search_without_api_key_is_invalid_descriptor() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let base_url = format!("{}/3/", mock_server.uri());
        let client = CatalogClient::builder()
            .base_url(base_url.parse().unwrap())
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Act
        let result = client.search("   ").await;

        // Assert
        assert!(matches!(result, Err(FetchError::InvalidDescriptor(_))));
    }

    #[tokio::test]
    async fn test_fetcher_over_http_discards_stale_response() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/movie/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id":1,"title":"Slow"}"#)
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/movie/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":2,"title":"Fast"}"#))
            .mount(&mock_server)
            .await;

        let client = Arc::new(client_for(&mock_server));
        let mut fetcher: ResourceFetcher<_, MovieDetails> = ResourceFetcher::new(client);

        // Act
        fetcher.subscribe(Some(CatalogRequest::details(1)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        fetcher.subscribe(Some(CatalogRequest::details(2)));
        let settled = fetcher.settled().await;
        tokio::time::sleep(Duration::from_millis(400)).await;

        // Assert
        assert_eq!(settled.payload().map(|d| d.id), Some(2));
        assert_eq!(fetcher.state().payload().map(|d| d.title.as_str()), Some("Fast"));
    }

    #[tokio::test]
    async fn test_fetcher_over_http_deduplicates_identical_descriptor() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/3/movie/550"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(include_str!(
                        "../../../../fixtures/catalog/movie_details_550.json"
                    ))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Arc::new(client_for(&mock_server));
        let mut fetcher: ResourceFetcher<_, MovieDetails> = ResourceFetcher::new(client);

        // Act
        fetcher.subscribe(Some(CatalogRequest::details(550)));
        fetcher.subscribe(Some(CatalogRequest::details(550)));
        let settled = fetcher.settled().await;

        // Assert
        assert_eq!(settled.payload().map(|d| d.title.as_str()), Some("Fight Club"));
    }

    #[tokio::test]
    async fn test_fetcher_without_api_key_publishes_missing_configuration() {
        // Arrange
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let base_url = format!("{}/3/", mock_server.uri());
        let client = CatalogClient::builder()
            .base_url(base_url.parse().unwrap())
            .user_agent("test/0.0.0")
            .build()
            .unwrap();
        let mut fetcher: ResourceFetcher<_> = ResourceFetcher::new(Arc::new(client));

        // Act
        let rx = fetcher.subscribe(Some(CatalogRequest::listing(MovieCategory::Popular, 1)));

        // Assert
        assert_eq!(
            *rx.borrow(),
            FetchState::Failure(FetchError::MissingConfiguration)
        );
    }
}
