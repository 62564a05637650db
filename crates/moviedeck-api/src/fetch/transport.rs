//! `ResourceTransport` trait definition.
#![allow(clippy::future_not_send)]

use serde_json::Value;

use super::descriptor::ResourceDescriptor;
use super::error::FetchError;

/// Executes a resource descriptor against a remote service.
///
/// Abstracts the HTTP side of the fetcher for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait, which
/// is the variant the fetcher requires because requests run on spawned tasks.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(ResourceTransport: Send)]
pub trait LocalResourceTransport {
    /// Checks that the transport is able to send requests at all.
    ///
    /// Called synchronously before every request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingConfiguration`] when a required
    /// credential is absent.
    fn ensure_configured(&self) -> Result<(), FetchError>;

    /// Sends a GET for `descriptor` and returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::HttpStatus`] for non-2xx responses,
    /// [`FetchError::Network`] for transport failures and
    /// [`FetchError::Malformed`] for undecodable bodies.
    async fn fetch(&self, descriptor: &ResourceDescriptor) -> Result<Value, FetchError>;
}
