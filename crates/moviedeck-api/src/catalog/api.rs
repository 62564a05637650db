//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use super::normalize::TrailerLookup;
use super::types::{CastMember, MovieCategory, MovieDetails, MoviePage, MovieSummary};
use crate::fetch::FetchResult;

/// Catalog API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Fetches one page of a category listing.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`](crate::fetch::FetchError) if the API key is
    /// missing, the request fails or the body cannot be decoded.
    async fn list_movies(&self, category: MovieCategory, page: u32) -> FetchResult<MoviePage>;

    /// Fetches the detail record of a movie.
    ///
    /// # Errors
    ///
    /// Same as [`list_movies`](Self::list_movies).
    async fn movie_details(&self, movie_id: u64) -> FetchResult<MovieDetails>;

    /// Fetches the first ten cast members of a movie.
    ///
    /// # Errors
    ///
    /// Same as [`list_movies`](Self::list_movies).
    async fn top_cast(&self, movie_id: u64) -> FetchResult<Vec<CastMember>>;

    /// Fetches the first four recommendations for a movie.
    ///
    /// # Errors
    ///
    /// Same as [`list_movies`](Self::list_movies).
    async fn recommendations(&self, movie_id: u64) -> FetchResult<Vec<MovieSummary>>;

    /// Searches movies by title.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidDescriptor`](crate::fetch::FetchError::InvalidDescriptor)
    /// for a blank query, otherwise same as [`list_movies`](Self::list_movies).
    async fn search(&self, query: &str) -> FetchResult<MoviePage>;

    /// Looks up the movie's YouTube trailer.
    ///
    /// # Errors
    ///
    /// Same as [`list_movies`](Self::list_movies). A movie without a trailer
    /// is not an error.
    async fn trailer(&self, movie_id: u64) -> FetchResult<TrailerLookup>;
}
