//! Remote resource fetcher module.
//!
//! A consumer owns one [`ResourceFetcher`] and points it at a
//! [`ResourceDescriptor`]; the fetcher publishes [`FetchState`] updates and
//! drops results that belong to a superseded descriptor.

mod descriptor;
mod error;
mod fetcher;
mod state;
mod transport;

pub use descriptor::ResourceDescriptor;
#[allow(clippy::module_name_repetitions)]
pub use error::{FetchError, FetchResult};
pub use fetcher::ResourceFetcher;
#[allow(clippy::module_name_repetitions)]
pub use state::FetchState;
pub use transport::{LocalResourceTransport, ResourceTransport};
